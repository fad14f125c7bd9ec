//! Error types for the API client.

/// Errors that can occur when calling the Codeforces API.
///
/// Every failure mode (transport, HTTP status, envelope status, decoding)
/// is folded into this one type so callers only ever match on a `Result`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("Request failed: {0}")]
    RequestFailed(String),
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The response envelope carried `status: "FAILED"`.
    #[error("API call failed: {comment}")]
    Failed { comment: String },
    /// The body was not a valid response envelope for the requested method.
    #[error("Malformed response: {0}")]
    Malformed(String),
}
