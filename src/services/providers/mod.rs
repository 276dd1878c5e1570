/// Search provider abstraction
///
/// Pluggable boundary around the external video-hosting search backend. The
/// core pipeline only ever sees this trait: one call starts a search, the
/// other resumes a previous one from its decoded continuation payload.
use crate::{
    error::AppResult,
    models::{ContinuationPayload, SearchOptions, SearchResults},
};

pub mod innertube;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Starts a fresh search for `term`
    ///
    /// Returns one batch of opaque items plus the backend's continuation
    /// value for the next page, when there is one.
    async fn search(&self, term: &str, options: &SearchOptions) -> AppResult<SearchResults>;

    /// Resumes a previous search from its decoded continuation payload
    async fn continue_search(&self, continuation: &ContinuationPayload)
        -> AppResult<SearchResults>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
