use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

mod issues;

pub use issues::{IssueCode, PathSegment, ValidationIssue};

/// Opaque wire form of a continuation: base64 over the payload's JSON.
///
/// Produced by a search call, replayed verbatim by the client on the next
/// request. The server never stores it; the token carries all paging state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationToken(pub String);

impl ContinuationToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Decoded continuation payload: an ordered sequence of entries, each one of
/// the three shapes the search backend round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuationPayload(pub Vec<ContinuationEntry>);

impl ContinuationPayload {
    /// First cursor entry, if any
    pub fn cursor(&self) -> Option<&str> {
        self.0.iter().find_map(|entry| match entry {
            ContinuationEntry::Cursor(cursor) => Some(cursor.as_str()),
            _ => None,
        })
    }

    /// First client-context entry, if any
    pub fn client_context(&self) -> Option<&ClientContext> {
        self.0.iter().find_map(|entry| match entry {
            ContinuationEntry::Client(context) => Some(context),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One element of a continuation payload.
///
/// Untagged: variants are attempted in declaration order, which must stay in
/// sync with the order the structural validator tries them (cursor string,
/// then client context, then search state).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContinuationEntry {
    Cursor(String),
    Client(ClientContext),
    State(SearchState),
}

/// Client identification block the backend expects alongside a continuation.
///
/// `user` and `request` are open records; unknown fields everywhere are
/// preserved so re-encoding a decoded payload reproduces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientContext {
    pub client: ClientInfo,
    pub user: Map<String, Value>,
    pub request: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub utc_offset_minutes: Number,
    pub gl: String,
    pub hl: String,
    pub client_name: String,
    pub client_version: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Snapshot of the search parameters a paging sequence was started with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    /// Present only as an explicit null on the wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<()>,
    pub safe_search: bool,
    pub pages: Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_options: Option<RequestOptions>,
    pub query: SearchQuerySpec,
    pub search: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuerySpec {
    pub gl: String,
    pub hl: String,
    pub search_query: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of request validation: absent continuation means a fresh search
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub continuation: Option<ContinuationPayload>,
}

/// Paging parameters for a fresh search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub limit: u32,
    pub pages: u32,
}

/// What a provider hands back for one page: opaque items plus the backend's
/// own next-page continuation value (already schema-shaped), if any
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub items: Vec<Value>,
    pub continuation: Option<Value>,
}

/// One page of results as returned to the HTTP boundary, with the next
/// continuation re-encoded into its wire form
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResultPage {
    pub items: Vec<Value>,
    pub continuation: Option<ContinuationToken>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_deserializes_cursor_string() {
        let entry: ContinuationEntry = serde_json::from_value(json!("EpcDEgRCT05L")).unwrap();
        assert_eq!(entry, ContinuationEntry::Cursor("EpcDEgRCT05L".to_string()));
    }

    #[test]
    fn test_entry_deserializes_client_context() {
        let value = json!({
            "client": {
                "utcOffsetMinutes": -120,
                "gl": "US",
                "hl": "en",
                "clientName": "WEB",
                "clientVersion": "2.20240101.00.00"
            },
            "user": {},
            "request": {}
        });

        let entry: ContinuationEntry = serde_json::from_value(value.clone()).unwrap();
        let ContinuationEntry::Client(context) = &entry else {
            panic!("expected client context, got {:?}", entry);
        };
        assert_eq!(context.client.client_name, "WEB");
        assert_eq!(context.client.utc_offset_minutes, Number::from(-120));

        // Unknown fields survive the round trip
        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_entry_deserializes_search_state() {
        let value = json!({
            "limit": null,
            "safeSearch": false,
            "pages": 1,
            "requestOptions": { "method": "POST" },
            "query": { "gl": "US", "hl": "en", "search_query": "BONK meme" },
            "search": "BONK meme"
        });

        let entry: ContinuationEntry = serde_json::from_value(value).unwrap();
        let ContinuationEntry::State(state) = entry else {
            panic!("expected search state");
        };
        assert!(!state.safe_search);
        assert_eq!(state.pages, Number::from(1));
        assert_eq!(state.query.search_query, "BONK meme");
        assert_eq!(state.request_options.unwrap().method.as_deref(), Some("POST"));
    }

    #[test]
    fn test_open_records_preserve_unknown_fields() {
        let value = json!({
            "client": {
                "utcOffsetMinutes": 0,
                "gl": "US",
                "hl": "en",
                "clientName": "WEB",
                "clientVersion": "2.20240101.00.00",
                "platform": "DESKTOP"
            },
            "user": { "lockedSafetyMode": false },
            "request": { "useSsl": true },
            "clickTracking": { "clickTrackingParams": "CBcQui8" }
        });

        let entry: ContinuationEntry = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&entry).unwrap(), value);
    }

    #[test]
    fn test_payload_accessors() {
        let payload: ContinuationPayload = serde_json::from_value(json!([
            "cursor-token",
            {
                "client": {
                    "utcOffsetMinutes": 0,
                    "gl": "US",
                    "hl": "en",
                    "clientName": "WEB",
                    "clientVersion": "2.20240101.00.00"
                },
                "user": {},
                "request": {}
            }
        ]))
        .unwrap();

        assert_eq!(payload.len(), 2);
        assert_eq!(payload.cursor(), Some("cursor-token"));
        assert_eq!(payload.client_context().unwrap().client.gl, "US");
    }
}
