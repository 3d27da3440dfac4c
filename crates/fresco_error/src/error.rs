//! Top-level error wrapper types.

use crate::{ClientError, ConfigError, MediaError, PipelineError, TemplateError};

/// The foundation error enum aggregating every Fresco error concern.
///
/// # Examples
///
/// ```
/// use fresco_error::{FrescoError, ConfigError};
///
/// let config_err = ConfigError::new("VIDEO_DURATION is not a number: soon");
/// let err: FrescoError = config_err.into();
/// assert!(format!("{}", err).contains("Config Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum FrescoErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Template parsing or evaluation error
    #[from(TemplateError)]
    Template(TemplateError),
    /// Remote service client error
    #[from(ClientError)]
    Client(ClientError),
    /// External media tool error
    #[from(MediaError)]
    Media(MediaError),
    /// Pipeline orchestration error
    #[from(PipelineError)]
    Pipeline(PipelineError),
}

/// Fresco error with kind discrimination.
///
/// # Examples
///
/// ```
/// use fresco_error::{FrescoResult, ConfigError};
///
/// fn might_fail() -> FrescoResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Fresco Error: {}", _0)]
pub struct FrescoError(Box<FrescoErrorKind>);

impl FrescoError {
    /// Create a new error from a kind.
    pub fn new(kind: FrescoErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &FrescoErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to FrescoErrorKind
impl<T> From<T> for FrescoError
where
    T: Into<FrescoErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Fresco operations.
pub type FrescoResult<T> = std::result::Result<T, FrescoError>;
