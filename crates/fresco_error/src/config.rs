//! Configuration error types.

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use fresco_error::ConfigError;
///
/// let err = ConfigError::new("VIDEO_DURATION is not a number");
/// assert!(format!("{}", err).contains("VIDEO_DURATION"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Config Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given message at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
