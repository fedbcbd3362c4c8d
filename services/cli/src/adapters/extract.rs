//! services/cli/src/adapters/extract.rs
//!
//! Text extraction from stored document files. Plain text files are read
//! directly; PDF extraction is delegated to the `pdf-extract` crate on a
//! blocking thread.

use async_trait::async_trait;
use std::path::Path;

use classdocs_core::domain::DocumentKind;
use classdocs_core::ports::{PortError, PortResult, TextExtractionService};

/// An adapter that implements `TextExtractionService` for the two supported
/// document kinds.
#[derive(Clone, Default)]
pub struct FileTextExtractor;

#[async_trait]
impl TextExtractionService for FileTextExtractor {
    async fn extract_text(&self, path: &Path, kind: DocumentKind) -> PortResult<String> {
        match kind {
            DocumentKind::Text => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| PortError::Storage(format!("reading {}: {e}", path.display()))),
            DocumentKind::Pdf => {
                let path = path.to_path_buf();
                tokio::task::spawn_blocking(move || {
                    pdf_extract::extract_text(&path)
                        .map_err(|e| PortError::Storage(format!("extracting {}: {e}", path.display())))
                })
                .await
                .map_err(|e| PortError::Storage(e.to_string()))?
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_plain_text_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, "water boils at 100C\n").await.unwrap();

        let text = FileTextExtractor
            .extract_text(&path, DocumentKind::Text)
            .await
            .unwrap();
        assert_eq!(text, "water boils at 100C\n");
    }

    #[tokio::test]
    async fn missing_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileTextExtractor
            .extract_text(&dir.path().join("gone.txt"), DocumentKind::Text)
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Storage(_)));
    }
}
