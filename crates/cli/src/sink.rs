//! Writes export artifacts to disk.

use std::path::{Path, PathBuf};

use crate::service::ExportArtifact;

/// Writes artifacts into one directory, creating it on first use.
///
/// An existing file with the same name is overwritten.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `artifact` and return the full path of the new file.
    pub async fn write(&self, artifact: &ExportArtifact) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&artifact.filename);
        tokio::fs::write(&path, artifact.content.as_bytes()).await?;

        tracing::info!(
            path = %path.display(),
            bytes = artifact.content.len(),
            mime_type = artifact.mime_type,
            "Export written",
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(name: &str, content: &str) -> ExportArtifact {
        ExportArtifact {
            filename: name.to_string(),
            mime_type: "text/csv",
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn writes_into_nested_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = FileSink::new(tmp.path().join("exports").join("march"));

        let path = sink.write(&artifact("a_2026-03-14.csv", "x;y\n")).await.unwrap();

        assert_eq!(path, tmp.path().join("exports/march/a_2026-03-14.csv"));
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "x;y\n");
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = FileSink::new(tmp.path());

        sink.write(&artifact("same.csv", "old")).await.unwrap();
        let path = sink.write(&artifact("same.csv", "new")).await.unwrap();

        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "new");
    }
}
