//! Descriptive metadata embedding via exiftool.

use crate::tool::run_tool;
use chrono::{DateTime, Utc};
use fresco_error::FrescoResult;
use std::path::Path;
use tracing::{info, instrument};

const METADATA_TIMEOUT_SECS: u64 = 10;

/// Run metadata written into the archived image's descriptive fields.
#[derive(Debug, Clone)]
pub struct ImageMetadata {
    /// The full image prompt
    pub prompt: String,
    /// Text-generation model used to compose the prompt
    pub prompt_model: String,
    /// Image-generation model used to render the image
    pub image_model: String,
    /// When the run started
    pub timestamp: DateTime<Utc>,
    /// Image size as `WIDTHxHEIGHT`
    pub size: String,
    /// Quality tier
    pub quality: String,
}

/// Embed the prompt and run metadata into the image in place.
#[instrument(skip(path, metadata))]
pub async fn embed_metadata(path: &Path, metadata: &ImageMetadata) -> FrescoResult<()> {
    info!(path = %path.display(), "embedding image metadata");

    let args = vec![
        "-overwrite_original".to_string(),
        format!("-ImageDescription={}", metadata.prompt),
        format!("-XMP:Description={}", metadata.prompt),
        format!(
            "-Software=fresco ({} -> {})",
            metadata.prompt_model, metadata.image_model
        ),
        format!(
            "-CreateDate={}",
            metadata.timestamp.format("%Y:%m:%d %H:%M:%S")
        ),
        format!("-Comment=size={} quality={}", metadata.size, metadata.quality),
        path.to_string_lossy().into_owned(),
    ];
    run_tool("exiftool", &args, METADATA_TIMEOUT_SECS).await?;
    Ok(())
}
