use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use crate::models::ContinuationToken;

/// Codec failures, ordered by pipeline stage
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("input is not a valid base64 string")]
    InvalidBase64,

    #[error("decoded value is not valid JSON: {0}")]
    MalformedJson(String),
}

/// Returns true when `input` is base64 that survives a decode/re-encode
/// round trip.
///
/// Stricter than an alphabet check: non-canonical padding decodes fine but
/// re-encodes differently, so it is rejected here.
pub fn is_valid_base64(input: &str) -> bool {
    match STANDARD.decode(input) {
        Ok(bytes) => STANDARD.encode(bytes) == input,
        Err(_) => false,
    }
}

/// Encodes a JSON value into its opaque wire token.
///
/// Total: compact-printing a `Value` and base64-encoding the result cannot
/// fail.
pub fn encode(value: &Value) -> ContinuationToken {
    ContinuationToken(STANDARD.encode(value.to_string()))
}

/// Decodes a wire token back into the JSON value it carries
pub fn decode(token: &str) -> Result<Value, TokenError> {
    if !is_valid_base64(token) {
        return Err(TokenError::InvalidBase64);
    }

    let bytes = STANDARD
        .decode(token)
        .map_err(|_| TokenError::InvalidBase64)?;

    serde_json::from_slice(&bytes).map_err(|err| TokenError::MalformedJson(err.to_string()))
}
