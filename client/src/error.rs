use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered with a non-success status.
    #[error("request failed: {status} - {body}")]
    Status { status: StatusCode, body: String },

    /// Transport-level failure (connect, timeout, decode).
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
