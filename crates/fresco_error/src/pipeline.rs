//! Pipeline orchestration error types.

/// Specific error conditions for the display pipeline.
///
/// Only the fatal stages surface through this type; best-effort stage
/// failures are recorded in the run report instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Text generation failed in both request modes
    #[display("Prompt generation failed: {}", _0)]
    PromptGeneration(String),
    /// A prompt file named on the input line could not be read
    #[display("Failed to read prompt file {}: {}", path, message)]
    PromptFile {
        /// Requested path
        path: String,
        /// OS error message
        message: String,
    },
}

/// Error type for pipeline operations.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
