use serde_json::{Map, Value};

use crate::models::{ContinuationEntry, ContinuationPayload, IssueCode, PathSegment, ValidationIssue};

/// Structural validator for decoded continuation payloads.
///
/// A payload is an array whose elements each match one of three shapes: a
/// plain cursor string, a client-context object, or a search-state object.
/// Shapes are tried in that order and the first match wins. Elements that
/// match nothing report the mismatches from every attempted shape, and every
/// failing element reports, so a caller sees the complete issue list in one
/// pass.
pub fn validate(value: &Value) -> Result<ContinuationPayload, Vec<ValidationIssue>> {
    let Some(elements) = value.as_array() else {
        return Err(vec![ValidationIssue::new(
            IssueCode::InvalidType,
            vec![],
            format!("Expected array, received {}", json_type(value)),
        )]);
    };

    let mut entries = Vec::with_capacity(elements.len());
    let mut issues = Vec::new();

    for (index, element) in elements.iter().enumerate() {
        match match_entry(element) {
            Ok(entry) => entries.push(entry),
            Err(element_issues) => issues.extend(
                element_issues
                    .into_iter()
                    .map(|issue| issue.prepend(PathSegment::Index(index))),
            ),
        }
    }

    if issues.is_empty() {
        Ok(ContinuationPayload(entries))
    } else {
        Err(issues)
    }
}

/// Tries the three entry shapes in order, returning the typed entry for the
/// first structural match, or the combined mismatches when none fits
fn match_entry(element: &Value) -> Result<ContinuationEntry, Vec<ValidationIssue>> {
    let cursor_issues = check_cursor(element);
    if cursor_issues.is_empty() {
        return typed_entry(element);
    }

    let client_issues = check_client_context(element);
    if client_issues.is_empty() {
        return typed_entry(element);
    }

    let state_issues = check_search_state(element);
    if state_issues.is_empty() {
        return typed_entry(element);
    }

    let mut issues = vec![ValidationIssue::new(
        IssueCode::InvalidUnion,
        vec![],
        "Value does not match any continuation entry shape",
    )];
    issues.extend(cursor_issues);
    issues.extend(client_issues);
    issues.extend(state_issues);
    Err(issues)
}

/// Deserializes an element that already passed a structural check.
///
/// The untagged enum attempts variants in the same order the checks run, so
/// this cannot pick a different shape than the one that matched.
fn typed_entry(element: &Value) -> Result<ContinuationEntry, Vec<ValidationIssue>> {
    serde_json::from_value(element.clone()).map_err(|err| {
        vec![ValidationIssue::new(
            IssueCode::InvalidType,
            vec![],
            err.to_string(),
        )]
    })
}

fn check_cursor(element: &Value) -> Vec<ValidationIssue> {
    if element.is_string() {
        vec![]
    } else {
        vec![ValidationIssue::new(
            IssueCode::InvalidType,
            vec![],
            format!("Expected string, received {}", json_type(element)),
        )]
    }
}

fn check_client_context(element: &Value) -> Vec<ValidationIssue> {
    let Some(object) = element.as_object() else {
        return vec![expected_object(vec![], element)];
    };

    let mut issues = Vec::new();

    match object.get("client") {
        None => issues.push(required(vec![PathSegment::key("client")])),
        Some(client) => match client.as_object() {
            None => issues.push(expected_object(vec![PathSegment::key("client")], client)),
            Some(client) => {
                check_number(client, "utcOffsetMinutes", "client", &mut issues);
                check_string(client, "gl", "client", &mut issues);
                check_string(client, "hl", "client", &mut issues);
                check_string(client, "clientName", "client", &mut issues);
                check_string(client, "clientVersion", "client", &mut issues);
            }
        },
    }

    // Open records: anything object-shaped is fine
    check_object(object, "user", &mut issues);
    check_object(object, "request", &mut issues);

    issues
}

fn check_search_state(element: &Value) -> Vec<ValidationIssue> {
    let Some(object) = element.as_object() else {
        return vec![expected_object(vec![], element)];
    };

    let mut issues = Vec::new();

    // `limit` may be omitted, but when present it must be an explicit null
    if let Some(limit) = object.get("limit") {
        if !limit.is_null() {
            issues.push(ValidationIssue::new(
                IssueCode::InvalidType,
                vec![PathSegment::key("limit")],
                format!("Expected null, received {}", json_type(limit)),
            ));
        }
    }

    match object.get("safeSearch") {
        None => issues.push(required(vec![PathSegment::key("safeSearch")])),
        Some(value) if !value.is_boolean() => issues.push(ValidationIssue::new(
            IssueCode::InvalidType,
            vec![PathSegment::key("safeSearch")],
            format!("Expected boolean, received {}", json_type(value)),
        )),
        Some(_) => {}
    }

    match object.get("pages") {
        None => issues.push(required(vec![PathSegment::key("pages")])),
        Some(value) if !value.is_number() => issues.push(ValidationIssue::new(
            IssueCode::InvalidType,
            vec![PathSegment::key("pages")],
            format!("Expected number, received {}", json_type(value)),
        )),
        Some(_) => {}
    }

    // `requestOptions` may be absent or an empty object; a `method` field, if
    // present, must be a string
    if let Some(options) = object.get("requestOptions") {
        match options.as_object() {
            None => issues.push(expected_object(vec![PathSegment::key("requestOptions")], options)),
            Some(options) => {
                if let Some(method) = options.get("method") {
                    if !method.is_string() {
                        issues.push(ValidationIssue::new(
                            IssueCode::InvalidType,
                            vec![PathSegment::key("requestOptions"), PathSegment::key("method")],
                            format!("Expected string, received {}", json_type(method)),
                        ));
                    }
                }
            }
        }
    }

    match object.get("query") {
        None => issues.push(required(vec![PathSegment::key("query")])),
        Some(query) => match query.as_object() {
            None => issues.push(expected_object(vec![PathSegment::key("query")], query)),
            Some(query_obj) => {
                check_string(query_obj, "gl", "query", &mut issues);
                check_string(query_obj, "hl", "query", &mut issues);
                check_string(query_obj, "search_query", "query", &mut issues);
            }
        },
    }

    check_string(object, "search", "", &mut issues);

    issues
}

fn check_string(object: &Map<String, Value>, field: &str, parent: &str, issues: &mut Vec<ValidationIssue>) {
    let path = field_path(parent, field);
    match object.get(field) {
        None => issues.push(required(path)),
        Some(value) if !value.is_string() => issues.push(ValidationIssue::new(
            IssueCode::InvalidType,
            path,
            format!("Expected string, received {}", json_type(value)),
        )),
        Some(_) => {}
    }
}

fn check_number(object: &Map<String, Value>, field: &str, parent: &str, issues: &mut Vec<ValidationIssue>) {
    let path = field_path(parent, field);
    match object.get(field) {
        None => issues.push(required(path)),
        Some(value) if !value.is_number() => issues.push(ValidationIssue::new(
            IssueCode::InvalidType,
            path,
            format!("Expected number, received {}", json_type(value)),
        )),
        Some(_) => {}
    }
}

fn check_object(object: &Map<String, Value>, field: &str, issues: &mut Vec<ValidationIssue>) {
    match object.get(field) {
        None => issues.push(required(vec![PathSegment::key(field)])),
        Some(value) if !value.is_object() => {
            issues.push(expected_object(vec![PathSegment::key(field)], value))
        }
        Some(_) => {}
    }
}

fn field_path(parent: &str, field: &str) -> Vec<PathSegment> {
    if parent.is_empty() {
        vec![PathSegment::key(field)]
    } else {
        vec![PathSegment::key(parent), PathSegment::key(field)]
    }
}

fn required(path: Vec<PathSegment>) -> ValidationIssue {
    ValidationIssue::new(IssueCode::InvalidType, path, "Required")
}

fn expected_object(path: Vec<PathSegment>, value: &Value) -> ValidationIssue {
    ValidationIssue::new(
        IssueCode::InvalidType,
        path,
        format!("Expected object, received {}", json_type(value)),
    )
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
