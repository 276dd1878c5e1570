/// Innertube search provider
///
/// Talks to the video backend's JSON search API. A fresh search posts the
/// query together with a client context block; paging continues by posting
/// the opaque cursor the backend returns alongside each page.
///
/// API flow:
/// 1. Fresh search: POST /search with { context, query } → renderer tree
///    containing video items and a continuation cursor.
/// 2. Next page: POST /search with { context, continuation } → appended
///    items and the following cursor.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde_json::{json, Map, Number, Value};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{
        ClientContext, ClientInfo, ContinuationEntry, ContinuationPayload, SearchOptions,
        SearchResults,
    },
    services::providers::SearchProvider,
};

#[derive(Clone)]
pub struct InnertubeProvider {
    http_client: HttpClient,
    api_url: String,
    api_key: String,
    context: ClientContext,
    safe_search: bool,
}

impl InnertubeProvider {
    /// Creates a provider from configuration.
    ///
    /// The HTTP client carries the configured timeout, so every backend call
    /// is bounded per request.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let context = ClientContext {
            client: ClientInfo {
                utc_offset_minutes: Number::from(config.utc_offset_minutes),
                gl: config.gl.clone(),
                hl: config.hl.clone(),
                client_name: config.client_name.clone(),
                client_version: config.client_version.clone(),
                extra: Map::new(),
            },
            user: Map::new(),
            request: Map::new(),
            extra: Map::new(),
        };

        Ok(Self {
            http_client,
            api_url: config.innertube_api_url.clone(),
            api_key: config.innertube_api_key.clone(),
            context,
            safe_search: config.safe_search,
        })
    }

    async fn post_search(&self, body: Value) -> AppResult<Value> {
        let url = format!("{}/search", self.api_url);

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str()), ("prettyPrint", "false")])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "search backend returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    fn context_value(&self) -> AppResult<Value> {
        serde_json::to_value(&self.context).map_err(|err| AppError::Internal(err.to_string()))
    }

    /// Assembles the continuation handed out after a fresh search: the
    /// backend's cursor plus everything needed to replay the request later
    fn continuation_value(&self, cursor: &str, term: &str) -> AppResult<Value> {
        Ok(json!([
            cursor,
            self.context_value()?,
            {
                "limit": null,
                "safeSearch": self.safe_search,
                "pages": 1,
                "requestOptions": { "method": "POST" },
                "query": {
                    "gl": self.context.client.gl,
                    "hl": self.context.client.hl,
                    "search_query": term
                },
                "search": term
            }
        ]))
    }
}

#[async_trait::async_trait]
impl SearchProvider for InnertubeProvider {
    async fn search(&self, term: &str, options: &SearchOptions) -> AppResult<SearchResults> {
        let limit = options.limit as usize;
        let mut items = Vec::new();

        let body = json!({ "context": self.context_value()?, "query": term });
        let response = self.post_search(body).await?;

        let sections = initial_sections(&response)
            .ok_or_else(|| AppError::Provider("unexpected search response shape".to_string()))?;
        let mut cursor = collect_items(sections, limit, &mut items);

        let mut pages_fetched = 1;
        while pages_fetched < options.pages && items.len() < limit {
            let Some(token) = cursor.take() else {
                break;
            };
            let body = json!({ "context": self.context_value()?, "continuation": token });
            let response = self.post_search(body).await?;
            let Some(sections) = continuation_sections(&response) else {
                break;
            };
            cursor = collect_items(sections, limit, &mut items);
            pages_fetched += 1;
        }

        tracing::info!(
            term = %term,
            results = items.len(),
            pages = pages_fetched,
            provider = "innertube",
            "Search completed"
        );

        let continuation = match cursor {
            Some(token) => Some(self.continuation_value(&token, term)?),
            None => None,
        };

        Ok(SearchResults { items, continuation })
    }

    async fn continue_search(
        &self,
        continuation: &ContinuationPayload,
    ) -> AppResult<SearchResults> {
        let cursor = continuation.cursor().ok_or_else(|| {
            AppError::Provider("continuation payload has no cursor entry".to_string())
        })?;

        // Replay the client's own context when it carried one
        let context = match continuation.client_context() {
            Some(context) => serde_json::to_value(context)
                .map_err(|err| AppError::Internal(err.to_string()))?,
            None => self.context_value()?,
        };

        let body = json!({ "context": context, "continuation": cursor });
        let response = self.post_search(body).await?;

        let mut items = Vec::new();
        let next_cursor = match continuation_sections(&response) {
            Some(sections) => collect_items(sections, usize::MAX, &mut items),
            None => None,
        };

        tracing::info!(
            results = items.len(),
            has_next = next_cursor.is_some(),
            provider = "innertube",
            "Continuation fetched"
        );

        let continuation = match next_cursor {
            Some(token) => Some(advance(continuation, &token)?),
            None => None,
        };

        Ok(SearchResults { items, continuation })
    }

    fn name(&self) -> &'static str {
        "innertube"
    }
}

/// Sections of a fresh search response
fn initial_sections(response: &Value) -> Option<&Vec<Value>> {
    response
        .pointer(
            "/contents/twoColumnSearchResultsRenderer/primaryContents/sectionListRenderer/contents",
        )
        .and_then(Value::as_array)
}

/// Sections appended by a continuation response
fn continuation_sections(response: &Value) -> Option<&Vec<Value>> {
    response
        .get("onResponseReceivedCommands")?
        .as_array()?
        .iter()
        .find_map(|command| command.pointer("/appendContinuationItemsAction/continuationItems"))
        .and_then(Value::as_array)
}

/// Pulls `videoRenderer` items out of a section list (up to `limit`) and
/// returns the next continuation cursor when the backend sent one
fn collect_items(sections: &[Value], limit: usize, items: &mut Vec<Value>) -> Option<String> {
    let mut cursor = None;

    for section in sections {
        if let Some(contents) = section
            .pointer("/itemSectionRenderer/contents")
            .and_then(Value::as_array)
        {
            for entry in contents {
                if items.len() >= limit {
                    break;
                }
                if let Some(video) = entry.get("videoRenderer") {
                    items.push(video.clone());
                }
            }
        }

        if let Some(token) = section
            .pointer("/continuationItemRenderer/continuationEndpoint/continuationCommand/token")
            .and_then(Value::as_str)
        {
            cursor = Some(token.to_string());
        }
    }

    cursor
}

/// Rebuilds a continuation payload around the next cursor, keeping every
/// other entry exactly as the client sent it
fn advance(payload: &ContinuationPayload, next_cursor: &str) -> AppResult<Value> {
    let mut entries = payload.0.clone();

    match entries
        .iter_mut()
        .find(|entry| matches!(entry, ContinuationEntry::Cursor(_)))
    {
        Some(ContinuationEntry::Cursor(cursor)) => *cursor = next_cursor.to_string(),
        _ => entries.insert(0, ContinuationEntry::Cursor(next_cursor.to_string())),
    }

    serde_json::to_value(entries).map_err(|err| AppError::Internal(err.to_string()))
}
