//! File writing.

use super::{required_str, Tool};
use crate::error::Result;
use async_trait::async_trait;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Failure to persist content, carrying the underlying I/O cause.
#[derive(Error, Debug)]
#[error("{path}: {source}")]
pub struct WriteError {
    pub path: String,
    #[source]
    pub source: std::io::Error,
}

/// Write `content` to `path` as UTF-8, truncating any existing file.
///
/// Parent directories are not created. The file handle is dropped (and so
/// closed) on every return path.
pub fn write_file(path: &Path, content: &str) -> std::result::Result<String, WriteError> {
    let wrap = |source: std::io::Error| WriteError {
        path: path.display().to_string(),
        source,
    };

    let mut file = File::create(path).map_err(wrap)?;
    file.write_all(content.as_bytes()).map_err(wrap)?;
    file.flush().map_err(wrap)?;

    info!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(format!("Successfully wrote content to {}", path.display()))
}

/// Resolve a possibly relative path against a base directory.
pub fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base_dir.join(candidate)
    }
}

/// Lets a stage persist text. Relative paths land in the output directory.
pub struct FileWriteTool {
    base_dir: PathBuf,
}

impl FileWriteTool {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "file_writer"
    }

    fn description(&self) -> &str {
        "Writes content to a file with UTF-8 encoding for Unicode support."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file where content will be written."
                },
                "content": {
                    "type": "string",
                    "description": "Content to write to the file."
                }
            },
            "required": ["file_path", "content"]
        })
    }

    async fn invoke(&self, args: serde_json::Value) -> Result<String> {
        let file_path = required_str(&args, "file_path")?;
        let content = required_str(&args, "content")?;
        let path = resolve_path(&self.base_dir, file_path);

        match write_file(&path, content) {
            Ok(confirmation) => Ok(confirmation),
            Err(e) => {
                warn!("File write failed: {}", e);
                Ok(format!("Error writing to file: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_is_utf8_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.md");
        let content = "# Überblick\n\n- 量子 bits\n- emoji 🧪\r\ntrailing   spaces  ";

        let confirmation = write_file(&path, content).unwrap();
        assert!(confirmation.starts_with("Successfully wrote content to"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.md");
        std::fs::write(&path, "a much longer previous body").unwrap();

        write_file(&path, "short").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "short");
    }

    #[test]
    fn test_missing_parent_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("guide.md");

        let err = write_file(&path, "content").unwrap_err();
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
        assert!(err.to_string().contains("no_such_dir"));
        assert!(!dir.path().join("no_such_dir").exists());
    }

    #[tokio::test]
    async fn test_tool_writes_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FileWriteTool::new(dir.path());

        let result = tool
            .invoke(serde_json::json!({
                "file_path": "rust_exam.md",
                "content": "# Rust"
            }))
            .await
            .unwrap();
        assert!(result.starts_with("Successfully wrote content to"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("rust_exam.md")).unwrap(),
            "# Rust"
        );
    }

    #[tokio::test]
    async fn test_tool_reports_failure_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FileWriteTool::new(dir.path());

        let result = tool
            .invoke(serde_json::json!({
                "file_path": "missing/rust_exam.md",
                "content": "# Rust"
            }))
            .await
            .unwrap();
        assert!(result.starts_with("Error writing to file:"));
    }

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/srv/guides");
        assert_eq!(resolve_path(base, "rust_exam.md"), PathBuf::from("/srv/guides/rust_exam.md"));
        assert_eq!(resolve_path(base, "/tmp/x.md"), PathBuf::from("/tmp/x.md"));
    }
}
