//! # Errors
//!
//! Only decoding can fail. Addressing a missing layer or an element without a
//! capability is a silent no-op, not an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DepictError {
    #[error("unknown message type {0}")]
    UnknownMessageType(i32),

    #[error("unknown canvas event {0}")]
    UnknownCanvasEvent(i32),

    /// INIT carries surfaces, which only move through [`crate::Message`].
    #[error("surfaces cannot travel over a data-only wire")]
    SurfaceTransfer,

    #[error("malformed {kind} payload: {source}")]
    Payload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = DepictError> = std::result::Result<T, E>;
