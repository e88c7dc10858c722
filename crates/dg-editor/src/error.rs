use dg_core::ModelError;
use thiserror::Error;

/// Errors crossing the action wire boundary.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("invalid action JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot encode action: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("cannot decode action: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Fatal dispatch failures. Unknown ids, capability mismatches, and merge
/// rejections are not errors; they are skipped.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A model-replacing command received a malformed schema. The current
    /// model is left untouched.
    #[error("cannot build model: {0}")]
    Model(#[from] ModelError),
}
