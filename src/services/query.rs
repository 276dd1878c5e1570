use std::collections::HashMap;

use crate::models::{IssueCode, PathSegment, ValidatedRequest, ValidationIssue};
use crate::services::token::{self, TokenError};
use crate::services::schema;

/// Query parameter carrying the continuation token
pub const CONTINUATION_PARAM: &str = "continuation";

/// Validates the inbound query parameter set.
///
/// The `continuation` parameter is optional; when absent the request is a
/// fresh search. When present it runs the staged pipeline: base64 round-trip
/// check, JSON parse, structural schema validation. Stages short-circuit, but
/// within the schema stage every issue in the payload is collected so the
/// caller can report the complete list. Purely synchronous; never touches a
/// provider.
pub fn validate_query(
    params: &HashMap<String, String>,
) -> Result<ValidatedRequest, Vec<ValidationIssue>> {
    let Some(raw) = params.get(CONTINUATION_PARAM) else {
        return Ok(ValidatedRequest { continuation: None });
    };

    // Dedicated pre-check so bad base64 reports as its own issue kind rather
    // than as a generic decode failure
    if !token::is_valid_base64(raw) {
        return Err(vec![ValidationIssue::new(
            IssueCode::InvalidBase64,
            vec![PathSegment::key(CONTINUATION_PARAM)],
            "Input is not a valid base64 string",
        )]);
    }

    let decoded = match token::decode(raw) {
        Ok(value) => value,
        Err(TokenError::InvalidBase64) => {
            return Err(vec![ValidationIssue::new(
                IssueCode::InvalidBase64,
                vec![PathSegment::key(CONTINUATION_PARAM)],
                "Input is not a valid base64 string",
            )]);
        }
        Err(TokenError::MalformedJson(parse_error)) => {
            return Err(vec![ValidationIssue::new(
                IssueCode::MalformedJson,
                vec![PathSegment::key(CONTINUATION_PARAM)],
                format!("Decoded value is not a valid JSON object: {parse_error}"),
            )]);
        }
    };

    let payload = schema::validate(&decoded).map_err(|issues| {
        issues
            .into_iter()
            .map(|issue| issue.prepend(PathSegment::key(CONTINUATION_PARAM)))
            .collect::<Vec<_>>()
    })?;

    Ok(ValidatedRequest {
        continuation: Some(payload),
    })
}
