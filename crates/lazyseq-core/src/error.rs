use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Canonical result for cursor operations.
pub type Result<T> = std::result::Result<T, CursorError>;

/// Error payload shared between every reader of a latched error.
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// Errors reported through the cursor protocol.
///
/// Latched errors are read repeatedly (`error()` is sticky), so the type is
/// `Clone`; wrapped payloads sit behind an `Arc`. The wrapped variants display
/// the payload verbatim: combinators pass errors through untouched and the
/// message a consumer sees is the one the source produced.
#[derive(Debug, Clone, Error)]
pub enum CursorError {
    #[error("cursor has not been advanced")]
    NotStarted,

    #[error("cursor is exhausted")]
    Exhausted,

    #[error("cursor was disposed")]
    Disposed,

    /// Upstream source failure (I/O, generation).
    #[error("{0}")]
    Source(SharedError),

    /// A caller-supplied size/key/transform function failed.
    #[error("{0}")]
    Callback(SharedError),

    /// Explicitly signaled by a producer through a channel bridge.
    #[error("{0}")]
    Producer(SharedError),
}

impl CursorError {
    pub fn source(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        CursorError::Source(Arc::from(err.into()))
    }

    pub fn callback(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        CursorError::Callback(Arc::from(err.into()))
    }

    pub fn producer(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        CursorError::Producer(Arc::from(err.into()))
    }

    /// True for the protocol-misuse variants (reading with no valid current item).
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            CursorError::NotStarted | CursorError::Exhausted | CursorError::Disposed
        )
    }

    /// The wrapped payload, if any.
    pub fn payload(&self) -> Option<&SharedError> {
        match self {
            CursorError::Source(e) | CursorError::Callback(e) | CursorError::Producer(e) => {
                Some(e)
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for CursorError {
    fn from(e: std::io::Error) -> Self {
        CursorError::source(e)
    }
}

/// Failures loading or validating a `PipelineConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read configuration file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
