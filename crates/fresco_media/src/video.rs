//! Still-image video loop encoding.

use crate::tool::run_tool;
use fresco_error::FrescoResult;
use std::path::Path;
use tracing::{info, instrument};

const ENCODE_TIMEOUT_SECS: u64 = 300;

/// Encoder settings for the display video loop.
#[derive(Debug, Clone)]
pub struct EncodeSettings {
    /// Duration of the loop in seconds
    pub duration: u64,
    /// Input frame rate for the still image
    pub framerate: String,
    /// Use the built-in argument list instead of `custom_args`
    pub use_default_args: bool,
    /// Raw operator-supplied arguments (whitespace-split; output path is
    /// appended)
    pub custom_args: String,
}

/// Built-in argument list: loop one still image for `duration` seconds at
/// the given input frame rate, constant-quality H.264, streaming-optimized.
pub fn default_encode_args(
    input: &Path,
    output: &Path,
    duration: u64,
    framerate: &str,
) -> Vec<String> {
    vec![
        "-y".to_string(),
        // Input framerate must precede -i
        "-framerate".to_string(),
        framerate.to_string(),
        "-loop".to_string(),
        "1".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-t".to_string(),
        duration.to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "ultrafast".to_string(),
        "-tune".to_string(),
        "stillimage".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        output.to_string_lossy().into_owned(),
    ]
}

/// Encode the working image into a looping video file.
#[instrument(skip(input, output, settings), fields(duration = settings.duration, framerate = %settings.framerate))]
pub async fn encode_video(
    input: &Path,
    output: &Path,
    settings: &EncodeSettings,
) -> FrescoResult<()> {
    info!("encoding display video");

    let args = if settings.use_default_args {
        default_encode_args(input, output, settings.duration, &settings.framerate)
    } else {
        let mut args: Vec<String> = settings
            .custom_args
            .split_whitespace()
            .map(String::from)
            .collect();
        args.push(output.to_string_lossy().into_owned());
        args
    };

    run_tool("ffmpeg", &args, ENCODE_TIMEOUT_SECS).await?;
    Ok(())
}
