//! Payment gateway errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// No response within the configured timeout. The payment state is
    /// unknown, not failed.
    #[error("payment gateway timed out")]
    Timeout,

    /// An HTTP transport error occurred.
    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    /// The gateway answered but declined the request.
    #[error("payment gateway rejected the request: {code}: {message}")]
    Rejected { code: String, message: String },

    /// The gateway returned a non-2xx response or unexpected body.
    #[error("unexpected response from payment gateway: {0}")]
    UnexpectedResponse(String),

    /// A callback's `X-VERIFY` header does not match its payload.
    #[error("invalid checksum")]
    InvalidChecksum,

    /// A callback payload could not be decoded.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A request payload could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(error)
        }
    }
}
