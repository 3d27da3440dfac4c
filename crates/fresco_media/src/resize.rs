//! Image resize filter.

use crate::tool::run_tool;
use fresco_core::parse_resolution;
use fresco_error::FrescoResult;
use std::path::Path;
use tracing::{info, instrument};

const RESIZE_TIMEOUT_SECS: u64 = 60;

/// Scale an image to the target resolution (preset name or `WIDTHxHEIGHT`).
///
/// Returns the resolved target dimensions on success.
#[instrument(skip(input, output))]
pub async fn resize_image(
    input: &Path,
    output: &Path,
    resolution: &str,
) -> FrescoResult<(u32, u32)> {
    let (width, height) = parse_resolution(resolution)?;
    info!(width, height, "resizing image");

    let args = vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-vf".to_string(),
        format!("scale={width}:{height}"),
        output.to_string_lossy().into_owned(),
    ];
    run_tool("ffmpeg", &args, RESIZE_TIMEOUT_SECS).await?;
    Ok((width, height))
}
