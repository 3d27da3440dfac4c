//! External media tool error types.

/// Specific error conditions for external filter invocations
/// (ffmpeg resize/encode, exiftool metadata embed).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum MediaErrorKind {
    /// The tool binary could not be spawned
    #[display("Failed to spawn {}: {}", tool, message)]
    Spawn {
        /// Tool binary name
        tool: String,
        /// OS error message
        message: String,
    },
    /// The tool exited with a non-zero status
    #[display("{} failed with status {}: {}", tool, status, stderr)]
    NonZeroExit {
        /// Tool binary name
        tool: String,
        /// Exit status code, or -1 if terminated by signal
        status: i32,
        /// Captured stderr
        stderr: String,
    },
    /// The tool did not finish within its timeout
    #[display("{} timed out after {}s", tool, seconds)]
    Timeout {
        /// Tool binary name
        tool: String,
        /// Timeout in seconds
        seconds: u64,
    },
    /// Moving or copying a working file failed
    #[display("File operation failed: {}", _0)]
    FileOperation(String),
}

/// Error type for external media tool operations.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Media Error: {} at line {} in {}", kind, line, file)]
pub struct MediaError {
    /// The specific error condition
    pub kind: MediaErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl MediaError {
    /// Create a new MediaError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: MediaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
