//! Shared external tool runner.

use fresco_error::{MediaError, MediaErrorKind};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Run an external tool to completion with a timeout.
///
/// The child is killed if the timeout elapses or the future is dropped.
pub(crate) async fn run_tool(
    tool: &str,
    args: &[String],
    timeout_secs: u64,
) -> Result<(), MediaError> {
    debug!(tool, ?args, "invoking external tool");

    let mut command = Command::new(tool);
    command.args(args).kill_on_drop(true);

    let output = tokio::time::timeout(Duration::from_secs(timeout_secs), command.output())
        .await
        .map_err(|_| {
            MediaError::new(MediaErrorKind::Timeout {
                tool: tool.to_string(),
                seconds: timeout_secs,
            })
        })?
        .map_err(|e| {
            MediaError::new(MediaErrorKind::Spawn {
                tool: tool.to_string(),
                message: e.to_string(),
            })
        })?;

    if !output.status.success() {
        return Err(MediaError::new(MediaErrorKind::NonZeroExit {
            tool: tool.to_string(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }));
    }
    Ok(())
}
