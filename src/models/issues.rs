use serde::{Deserialize, Serialize};

/// Machine-readable category for a single validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidBase64,
    MalformedJson,
    InvalidType,
    InvalidUnion,
}

/// One step in the path from the request root to the offending value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    pub fn key(name: &str) -> Self {
        PathSegment::Key(name.to_string())
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Key(name.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A single structural validation failure, addressed by path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(code: IssueCode, path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self {
            code,
            path,
            message: message.into(),
        }
    }

    /// Returns the issue with `segment` prepended to its path
    pub fn prepend(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_code_serializes_snake_case() {
        let json = serde_json::to_string(&IssueCode::InvalidBase64).unwrap();
        assert_eq!(json, r#""invalid_base64""#);
        let json = serde_json::to_string(&IssueCode::MalformedJson).unwrap();
        assert_eq!(json, r#""malformed_json""#);
    }

    #[test]
    fn test_path_segments_serialize_untagged() {
        let issue = ValidationIssue::new(
            IssueCode::InvalidType,
            vec![PathSegment::key("continuation"), PathSegment::Index(2), PathSegment::key("query")],
            "Required",
        );
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["path"], serde_json::json!(["continuation", 2, "query"]));
        assert_eq!(json["message"], "Required");
    }

    #[test]
    fn test_prepend_builds_path_outside_in() {
        let issue = ValidationIssue::new(IssueCode::InvalidType, vec![PathSegment::key("search")], "Required")
            .prepend(PathSegment::Index(0))
            .prepend(PathSegment::key("continuation"));
        assert_eq!(
            issue.path,
            vec![
                PathSegment::key("continuation"),
                PathSegment::Index(0),
                PathSegment::key("search")
            ]
        );
    }
}
