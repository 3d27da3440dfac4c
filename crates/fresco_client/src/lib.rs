//! Remote service clients for the Fresco pipeline.
//!
//! Three collaborators live behind trait seams so the orchestrator can be
//! exercised with mock implementations:
//!
//! - [`SupervisorClient`] — Home Assistant supervisor API (state snapshot
//!   fetch and outbound events)
//! - [`TextClient`] — text-generation service with a richer web-search
//!   request mode and a simpler fallback mode
//! - [`ImageClient`] — image-generation service returning decoded bytes

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod image;
mod supervisor;
mod text;
mod traits;

pub use image::ImageClient;
pub use supervisor::SupervisorClient;
pub use text::TextClient;
pub use traits::{
    EventSink, ImageGenerator, ImageRequest, LocationHint, PromptGenerator, PromptRequest,
    PromptResponse, StateSource, TokenUsage,
};
