//! Error types for nbpipe.
//!
//! Backpressure and absence of data are not errors: they surface as
//! `Ok(false)` from `send` and `Ok(None)` from `recv`/`readline`.

use thiserror::Error;

/// Main error type for all pipe operations.
#[derive(Debug, Error)]
pub enum PipeError {
    /// I/O error from the underlying socket or poll call.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while loading configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// A received record was not valid UTF-8.
    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] std::string::FromUtf8Error),

    /// Encoded message does not fit in a single transport message.
    #[error("Message of {size} bytes exceeds maximum {max}")]
    MessageTooLarge { size: usize, max: usize },

    /// The peer endpoint hung up.
    #[error("Connection closed")]
    ConnectionClosed,
}

/// Result type alias using PipeError.
pub type Result<T> = std::result::Result<T, PipeError>;
