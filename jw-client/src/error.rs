//! Failure taxonomy for the remote data client.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, DNS, or timeout failure before any HTTP status arrived.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status other than an authorization failure.
    #[error("server returned {status}: {detail}")]
    Status { status: StatusCode, detail: String },

    /// A data endpoint rejected the session token.
    #[error("session expired")]
    Unauthorized,

    /// The login endpoint rejected the credentials.
    #[error("invalid username or password")]
    BadCredentials,

    /// The body did not match the expected envelope shape.
    #[error("malformed response body: {0}")]
    Decode(#[source] reqwest::Error),
}
