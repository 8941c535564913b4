use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("result metadata could not be resolved")]
    MetadataUnresolved,

    #[error("failed to bind result buffers: {0}")]
    Bind(#[source] NativeError),

    #[error("statement execution failed: {0}")]
    Execute(#[source] NativeError),

    /// A second `fetch_next` (or `done`) was issued before the previous one
    /// completed. The underlying row cursor is strictly sequential.
    #[error("a fetch is already in flight on this fetcher")]
    FetchInFlight,

    #[cfg(feature = "tokio")]
    #[error("background fetch task failed: {0}")]
    Background(#[from] tokio::task::JoinError),
}

/// Diagnostic text reported by the native client library.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct NativeError(pub String);

impl NativeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
