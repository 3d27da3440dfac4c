//! External media tool invocations for the Fresco pipeline.
//!
//! Each operation wraps one opaque command-line filter (`ffmpeg` for resize
//! and video encoding, `exiftool` for metadata embedding) behind a blocking
//! call with an explicit timeout: short for metadata, long for encoding.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod files;
mod metadata;
mod resize;
mod tool;
mod video;

pub use files::relocate;
pub use metadata::{embed_metadata, ImageMetadata};
pub use resize::resize_image;
pub use video::{default_encode_args, encode_video, EncodeSettings};
