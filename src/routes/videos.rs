use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::ContinuationToken;
use crate::services::{query, search};

use super::AppState;

/// Response envelope for the video search endpoint
#[derive(Debug, Serialize)]
pub struct VideosResponse {
    pub data: Vec<Value>,
    pub metadata: VideosMetadata,
}

#[derive(Debug, Serialize)]
pub struct VideosMetadata {
    /// Wire token for the next page; null when the backend is done
    pub continuation: Option<ContinuationToken>,
}

/// Handler for the video search endpoint.
///
/// Validates the query parameters (including the optional continuation
/// token), then runs exactly one search or continue call against the
/// provider. Validation failures never reach the provider.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<VideosResponse>> {
    let request = query::validate_query(&params).map_err(AppError::Validation)?;

    let page = search::dispatch(state.provider.clone(), &state.defaults, request).await?;

    Ok(Json(VideosResponse {
        data: page.items,
        metadata: VideosMetadata {
            continuation: page.continuation,
        },
    }))
}
