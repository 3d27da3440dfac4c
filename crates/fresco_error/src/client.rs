//! Remote service client error types.

/// Specific error conditions for the remote generation and supervisor APIs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ClientErrorKind {
    /// Request could not be sent
    #[display("Request failed: {}", _0)]
    Request(String),
    /// The API answered with a non-success status
    #[display("API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },
    /// Response body could not be parsed
    #[display("Failed to parse response: {}", _0)]
    Parse(String),
    /// Response parsed but carried no usable payload
    #[display("Empty response payload: {}", _0)]
    EmptyPayload(String),
    /// Returned image data was not valid base64
    #[display("Base64 decode error: {}", _0)]
    Base64Decode(String),
    /// Credential required for this call is not configured
    #[display("Missing credential: {}", _0)]
    MissingCredential(String),
}

/// Error type for remote service clients.
///
/// # Examples
///
/// ```
/// use fresco_error::{ClientError, ClientErrorKind};
///
/// let err = ClientError::new(ClientErrorKind::Api {
///     status: 429,
///     message: "rate limited".into(),
/// });
/// assert!(format!("{}", err).contains("429"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Client Error: {} at line {} in {}", kind, line, file)]
pub struct ClientError {
    /// The specific error condition
    pub kind: ClientErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ClientError {
    /// Create a new ClientError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ClientErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
