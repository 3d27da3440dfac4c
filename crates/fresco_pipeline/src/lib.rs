//! Pipeline orchestration for the Fresco display worker.
//!
//! One [`Pipeline`] owns the fixed-order generation sequence: snapshot,
//! location and context resolution, prompt composition and text generation,
//! image generation, then the best-effort post-processing stages (archive,
//! resize, video) and outbound event notification.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod location;
mod orchestrator;
mod prompt;

pub use location::{resolve_location, ResolvedLocation};
pub use orchestrator::{DirectImageRequest, Pipeline};
pub use prompt::{compose, ComposedPrompt, DEFAULT_SYSTEM_PROMPT, DEFAULT_USER_PROMPT_TEMPLATE};
