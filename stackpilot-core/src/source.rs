//! Local file access.
//!
//! The orchestrator reads templates, parameter files and overlays through the
//! `FileSource` trait so tests can serve them from memory.

use crate::error::{Result, StackError};
use async_trait::async_trait;
use std::path::Path;
use tracing::{instrument, warn};

/// Read access to local files.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Read a UTF-8 file.
    ///
    /// A missing file must be reported as `FileReadError` whose source has
    /// kind `NotFound`; callers rely on that to apply defaults.
    async fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// `FileSource` backed by the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct LocalFiles;

#[async_trait]
impl FileSource for LocalFiles {
    #[instrument(skip(self))]
    async fn read_to_string(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StackError::FileReadError { path: path.to_path_buf(), source })
    }
}

/// Read an optional file, falling back to `default` when no path was given or
/// the file does not exist.
///
/// Any other read failure is returned.
pub async fn read_optional(
    files: &dyn FileSource,
    path: Option<&Path>,
    default: &str,
) -> Result<String> {
    let Some(path) = path else {
        return Ok(default.to_string());
    };

    match files.read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(StackError::FileReadError { path, source })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            warn!(path = %path.display(), "File not found, using defaults");
            Ok(default.to_string())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_local_files_read() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "FOO=bar").unwrap();

        let content = LocalFiles.read_to_string(file.path()).await.unwrap();
        assert_eq!(content, "FOO=bar");
    }

    #[tokio::test]
    async fn test_local_files_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFiles.read_to_string(&dir.path().join("absent.json")).await.unwrap_err();
        match err {
            StackError::FileReadError { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_read_optional_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("tags.json");

        assert_eq!(read_optional(&LocalFiles, None, "{}").await.unwrap(), "{}");
        assert_eq!(read_optional(&LocalFiles, Some(missing.as_path()), "{}").await.unwrap(), "{}");

        std::fs::write(&missing, r#"{"env":"prod"}"#).unwrap();
        assert_eq!(
            read_optional(&LocalFiles, Some(missing.as_path()), "{}").await.unwrap(),
            r#"{"env":"prod"}"#
        );
    }
}
