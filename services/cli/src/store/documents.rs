//! services/cli/src/store/documents.rs
//!
//! The document store: the single writer of `docs/` and the owner of the
//! name-to-path mapping. Upload copies the file in and inserts metadata as
//! one logical step; delete removes both sides with no observable orphan.

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use classdocs_core::domain::{Document, DocumentKind, User};
use classdocs_core::ports::{DatabaseService, PortError, PortResult};

use crate::layout::DirLayout;

pub struct DocumentStore {
    db: Arc<dyn DatabaseService>,
    layout: DirLayout,
}

impl DocumentStore {
    pub fn new(db: Arc<dyn DatabaseService>, layout: DirLayout) -> Self {
        Self { db, layout }
    }

    /// Copies `source` into the managed directory and records its metadata.
    ///
    /// Duplicate policy: a document name that already exists is REJECTED;
    /// the existing document is left untouched. If the metadata insert
    /// fails after the copy, the copied file is removed again.
    pub async fn upload(&self, source: &Path, owner: &User) -> PortResult<Document> {
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                PortError::InvalidArgument(format!("invalid file path '{}'", source.display()))
            })?
            .to_string();

        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let kind = DocumentKind::from_extension(&extension)
            .ok_or_else(|| PortError::UnsupportedFormat(name.clone()))?;

        if tokio::fs::metadata(source).await.is_err() {
            return Err(PortError::NotFound(format!(
                "file '{}' does not exist",
                source.display()
            )));
        }

        if self.db.find_document_by_name(&name).await?.is_some() {
            return Err(PortError::DuplicateName(name));
        }

        let dest = self.layout.docs.join(&name);
        tokio::fs::copy(source, &dest)
            .await
            .map_err(|e| PortError::Storage(format!("copying into docs/: {e}")))?;

        let document = Document {
            id: Uuid::new_v4(),
            name,
            owner_id: owner.id,
            storage_path: dest.to_string_lossy().into_owned(),
            kind,
            uploaded_at: Utc::now(),
        };

        if let Err(e) = self.db.insert_document(&document).await {
            // Roll the copy back so no file exists without its metadata row.
            if let Err(cleanup) = tokio::fs::remove_file(&dest).await {
                warn!("failed to remove {} after insert failure: {cleanup}", dest.display());
            }
            return Err(e);
        }

        Ok(document)
    }

    /// All documents in stable upload order.
    pub async fn list(&self) -> PortResult<Vec<Document>> {
        self.db.list_documents().await
    }

    pub async fn resolve(&self, name: &str) -> PortResult<Document> {
        self.db
            .find_document_by_name(name)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("document '{name}'")))
    }

    /// Removes the document's file and metadata row.
    ///
    /// The file is first renamed aside, then the row is deleted; a failed
    /// row delete renames the file back. Neither a file without a row nor a
    /// row without a file is ever observable. A document with a generated
    /// quiz cannot be deleted; the quiz row references it.
    pub async fn delete(&self, name: &str) -> PortResult<()> {
        let document = self.resolve(name).await?;

        if self.db.find_quiz_by_document(document.id).await?.is_some() {
            return Err(PortError::InvalidArgument(format!(
                "document '{name}' has a generated quiz and cannot be deleted"
            )));
        }
        let path = Path::new(&document.storage_path);
        let trash = path.with_file_name(format!("{name}.removing"));

        match tokio::fs::rename(path, &trash).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // The file is already gone; still drop the metadata row.
                warn!("document file {} was missing before delete", path.display());
                return self.db.delete_document(document.id).await;
            }
            Err(e) => return Err(PortError::Storage(format!("removing document file: {e}"))),
        }

        if let Err(e) = self.db.delete_document(document.id).await {
            if let Err(restore) = tokio::fs::rename(&trash, path).await {
                warn!("failed to restore {} after delete failure: {restore}", path.display());
            }
            return Err(e);
        }

        if let Err(e) = tokio::fs::remove_file(&trash).await {
            warn!("failed to remove {}: {e}", trash.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::db::test_support::memory_adapter;
    use classdocs_core::domain::Role;

    struct Fixture {
        store: DocumentStore,
        owner: User,
        dir: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let db = Arc::new(memory_adapter().await);
        let owner = db
            .create_user("Sam Poe", "poe@example.edu", Role::Teacher, "hash")
            .await
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let layout = DirLayout::new(dir.path());
        layout.ensure().await.unwrap();
        Fixture {
            store: DocumentStore::new(db, layout),
            owner,
            dir,
        }
    }

    async fn write_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        tokio::fs::write(&path, contents).await.unwrap();
        path
    }

    #[tokio::test]
    async fn upload_copies_file_and_records_metadata() {
        let f = fixture().await;
        let source = write_source(&f.dir, "syllabus.txt", "week 1: intro\n").await;

        let doc = f.store.upload(&source, &f.owner).await.unwrap();
        assert_eq!(doc.name, "syllabus.txt");
        assert_eq!(doc.kind, DocumentKind::Text);

        let resolved = f.store.resolve("syllabus.txt").await.unwrap();
        assert!(Path::new(&resolved.storage_path).exists());
        // The original stays where it was; upload copies.
        assert!(source.exists());
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected() {
        let f = fixture().await;
        let source = write_source(&f.dir, "slides.pptx", "x").await;

        let err = f.store.upload(&source, &f.owner).await.unwrap_err();
        assert!(matches!(err, PortError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn missing_source_file_is_not_found() {
        let f = fixture().await;
        let err = f
            .store
            .upload(&f.dir.path().join("ghost.txt"), &f.owner)
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_upload_leaves_first_document_untouched() {
        let f = fixture().await;
        let first = write_source(&f.dir, "syllabus.txt", "original contents\n").await;
        f.store.upload(&first, &f.owner).await.unwrap();

        let altered = f.dir.path().join("other").join("syllabus.txt");
        tokio::fs::create_dir_all(altered.parent().unwrap()).await.unwrap();
        tokio::fs::write(&altered, "different contents\n").await.unwrap();

        let err = f.store.upload(&altered, &f.owner).await.unwrap_err();
        assert!(matches!(err, PortError::DuplicateName(_)));

        let stored = f.store.resolve("syllabus.txt").await.unwrap();
        let bytes = tokio::fs::read_to_string(&stored.storage_path).await.unwrap();
        assert_eq!(bytes, "original contents\n");
    }

    #[tokio::test]
    async fn delete_removes_both_file_and_metadata() {
        let f = fixture().await;
        let source = write_source(&f.dir, "syllabus.txt", "x\n").await;
        let doc = f.store.upload(&source, &f.owner).await.unwrap();

        f.store.delete("syllabus.txt").await.unwrap();

        assert!(!Path::new(&doc.storage_path).exists());
        let err = f.store.resolve("syllabus.txt").await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_refused_while_a_quiz_references_the_document() {
        let f = fixture().await;
        let source = write_source(&f.dir, "syllabus.txt", "x\n").await;
        let doc = f.store.upload(&source, &f.owner).await.unwrap();

        let quiz = classdocs_core::domain::Quiz {
            id: Uuid::new_v4(),
            document_id: doc.id,
            question_count: 1,
            storage_path: "quizzes/syllabus.txt.quiz.txt".to_string(),
            generated_at: Utc::now(),
        };
        let key = classdocs_core::domain::AnswerKey {
            id: Uuid::new_v4(),
            quiz_id: quiz.id,
            storage_path: "answer_keys/syllabus.txt.key.txt".to_string(),
        };
        f.store.db.insert_quiz_with_key(&quiz, &key).await.unwrap();

        let err = f.store.delete("syllabus.txt").await.unwrap_err();
        assert!(matches!(err, PortError::InvalidArgument(_)));
        assert!(Path::new(&doc.storage_path).exists());
    }

    #[tokio::test]
    async fn delete_of_unknown_document_is_not_found() {
        let f = fixture().await;
        let err = f.store.delete("ghost.txt").await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_returns_documents_in_upload_order() {
        let f = fixture().await;
        for name in ["a.txt", "b.txt"] {
            let source = write_source(&f.dir, name, "x").await;
            f.store.upload(&source, &f.owner).await.unwrap();
        }

        let names: Vec<String> = f
            .store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }
}
