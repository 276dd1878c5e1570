use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{SearchOptions, SearchResultPage, ValidatedRequest};
use crate::services::providers::SearchProvider;
use crate::services::token;

/// Fixed parameters for fresh searches, supplied by configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDefaults {
    pub term: String,
    pub limit: u32,
    pub pages: u32,
}

/// Runs exactly one provider call for a validated request: a fresh search
/// when no continuation was supplied, a continue call otherwise. The
/// provider's next-page continuation, if any, is re-encoded into its wire
/// token before the page is handed back to the HTTP boundary. A provider
/// failure propagates after this single attempt; nothing is retried.
pub async fn dispatch(
    provider: Arc<dyn SearchProvider>,
    defaults: &SearchDefaults,
    request: ValidatedRequest,
) -> AppResult<SearchResultPage> {
    let results = match &request.continuation {
        None => {
            tracing::info!(
                term = %defaults.term,
                limit = defaults.limit,
                pages = defaults.pages,
                provider = provider.name(),
                "Dispatching fresh search"
            );
            provider
                .search(
                    &defaults.term,
                    &SearchOptions {
                        limit: defaults.limit,
                        pages: defaults.pages,
                    },
                )
                .await?
        }
        Some(payload) => {
            tracing::info!(
                entries = payload.len(),
                provider = provider.name(),
                "Resuming search from continuation"
            );
            provider.continue_search(payload).await?
        }
    };

    let continuation = results.continuation.as_ref().map(token::encode);

    tracing::info!(
        items = results.items.len(),
        has_continuation = continuation.is_some(),
        "Search page assembled"
    );

    Ok(SearchResultPage {
        items: results.items,
        continuation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{ContinuationPayload, SearchResults};
    use crate::services::providers::MockSearchProvider;
    use crate::services::schema;
    use serde_json::json;

    fn defaults() -> SearchDefaults {
        SearchDefaults {
            term: "BONK meme".to_string(),
            limit: 10,
            pages: 1,
        }
    }

    fn fresh_request() -> ValidatedRequest {
        ValidatedRequest { continuation: None }
    }

    fn continuation_request() -> ValidatedRequest {
        let payload: ContinuationPayload = serde_json::from_value(json!(["abc"])).unwrap();
        ValidatedRequest {
            continuation: Some(payload),
        }
    }

    #[tokio::test]
    async fn test_fresh_request_searches_with_defaults() {
        let mut provider = MockSearchProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_search()
            .withf(|term, options| term == "BONK meme" && options.limit == 10 && options.pages == 1)
            .once()
            .returning(|_, _| {
                Ok(SearchResults {
                    items: vec![json!({ "videoId": "abc123" })],
                    continuation: None,
                })
            });
        provider.expect_continue_search().never();

        let page = dispatch(Arc::new(provider), &defaults(), fresh_request())
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.continuation, None);
    }

    #[tokio::test]
    async fn test_continuation_request_resumes_instead_of_searching() {
        let mut provider = MockSearchProvider::new();
        provider.expect_name().return_const("mock");
        provider.expect_search().never();
        provider
            .expect_continue_search()
            .withf(|payload| payload.cursor() == Some("abc"))
            .once()
            .returning(|_| {
                Ok(SearchResults {
                    items: vec![json!({ "videoId": "next456" })],
                    continuation: None,
                })
            });

        let page = dispatch(Arc::new(provider), &defaults(), continuation_request())
            .await
            .unwrap();

        assert_eq!(page.items[0]["videoId"], "next456");
    }

    #[tokio::test]
    async fn test_next_continuation_is_reencoded_and_schema_valid() {
        let next = json!(["next-cursor"]);
        let returned = next.clone();

        let mut provider = MockSearchProvider::new();
        provider.expect_name().return_const("mock");
        provider.expect_search().once().returning(move |_, _| {
            Ok(SearchResults {
                items: vec![],
                continuation: Some(returned.clone()),
            })
        });

        let page = dispatch(Arc::new(provider), &defaults(), fresh_request())
            .await
            .unwrap();

        let token = page.continuation.unwrap();
        let decoded = token::decode(token.as_str()).unwrap();
        assert_eq!(decoded, next);
        assert!(schema::validate(&decoded).is_ok());
    }

    #[tokio::test]
    async fn test_provider_failure_propagates_unretried() {
        let mut provider = MockSearchProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_search()
            .once()
            .returning(|_, _| Err(AppError::Provider("backend exploded".to_string())));

        let err = dispatch(Arc::new(provider), &defaults(), fresh_request())
            .await
            .unwrap_err();

        match err {
            AppError::Provider(message) => assert_eq!(message, "backend exploded"),
            other => panic!("expected provider error, got {:?}", other),
        }
    }
}
