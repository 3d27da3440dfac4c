//! Working-file operations.

use fresco_error::{FrescoResult, MediaError, MediaErrorKind};
use std::path::Path;
use tracing::debug;

/// Move a file, falling back to copy+remove across filesystems.
pub async fn relocate(from: &Path, to: &Path) -> FrescoResult<()> {
    debug!(from = %from.display(), to = %to.display(), "relocating file");

    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }

    tokio::fs::copy(from, to).await.map_err(|e| {
        MediaError::new(MediaErrorKind::FileOperation(format!(
            "copy {} -> {}: {}",
            from.display(),
            to.display(),
            e
        )))
    })?;
    tokio::fs::remove_file(from).await.map_err(|e| {
        MediaError::new(MediaErrorKind::FileOperation(format!(
            "remove {}: {}",
            from.display(),
            e
        )))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn relocate_moves_content() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.png");
        let to = dir.path().join("b.png");
        tokio::fs::write(&from, b"image bytes").await.unwrap();

        relocate(&from, &to).await.unwrap();

        assert!(!from.exists());
        assert_eq!(tokio::fs::read(&to).await.unwrap(), b"image bytes");
    }

    #[tokio::test]
    async fn relocate_missing_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("missing.png");
        let to = dir.path().join("b.png");
        assert!(relocate(&from, &to).await.is_err());
    }
}
