//! Error types for the chat client.

use thiserror::Error;

/// Errors surfaced to callers of [`ChatClient`](crate::client::ChatClient).
///
/// Only transport-level failures cross this boundary: malformed stream
/// payloads are absorbed by the decoder's rollback policy, and unknown
/// event lines are skipped during classification.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or the connection broke mid-stream.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status before streaming began.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
}
