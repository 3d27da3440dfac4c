//! Error types for the Fresco display pipeline.
//!
//! This crate provides the foundation error types used throughout the Fresco
//! workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use fresco_error::{ClientError, ClientErrorKind, FrescoResult};
//!
//! fn fetch_states() -> FrescoResult<String> {
//!     Err(ClientError::new(ClientErrorKind::Request("Connection refused".into())))?
//! }
//!
//! match fetch_states() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod media;
mod pipeline;
mod template;

pub use client::{ClientError, ClientErrorKind};
pub use config::ConfigError;
pub use error::{FrescoError, FrescoErrorKind, FrescoResult};
pub use media::{MediaError, MediaErrorKind};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use template::{TemplateError, TemplateErrorKind};
