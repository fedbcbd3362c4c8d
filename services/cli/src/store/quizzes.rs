//! services/cli/src/store/quizzes.rs
//!
//! The quiz store: owner of `quizzes/` and `answer_keys/`. A quiz and its
//! answer key are created as a pair: both files are written first (temp
//! file renamed into place), then both rows are inserted in one database
//! transaction. Every way the tool observes a quiz goes through the
//! database, so a failure before the commit leaves nothing visible.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use classdocs_core::domain::{AnswerKey, Quiz};
use classdocs_core::ports::{
    DatabaseService, GenerationService, PortError, PortResult, TextExtractionService,
};

use crate::layout::DirLayout;

/// Question count used when the caller does not pass `--n`.
pub const DEFAULT_QUESTION_COUNT: u32 = 5;

pub struct QuizStore {
    db: Arc<dyn DatabaseService>,
    layout: DirLayout,
    extractor: Arc<dyn TextExtractionService>,
}

impl QuizStore {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        layout: DirLayout,
        extractor: Arc<dyn TextExtractionService>,
    ) -> Self {
        Self {
            db,
            layout,
            extractor,
        }
    }

    /// Generates a quiz/answer-key pair for the named document.
    pub async fn generate(
        &self,
        generator: &dyn GenerationService,
        document_name: &str,
        question_count: u32,
    ) -> PortResult<(Quiz, AnswerKey)> {
        if question_count == 0 {
            return Err(PortError::InvalidArgument(
                "question count must be a positive integer".to_string(),
            ));
        }

        let document = self
            .db
            .find_document_by_name(document_name)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("document '{document_name}'")))?;

        // One quiz per document; regenerating means deleting first.
        if self.db.find_quiz_by_document(document.id).await?.is_some() {
            return Err(PortError::DuplicateName(format!(
                "a quiz for '{document_name}' already exists"
            )));
        }

        let text = self
            .extractor
            .extract_text(Path::new(&document.storage_path), document.kind)
            .await?;

        let generated = generator.generate_quiz(&text, question_count).await?;

        let quiz_path = self.layout.quizzes.join(format!("{document_name}.quiz.txt"));
        let key_path = self
            .layout
            .answer_keys
            .join(format!("{document_name}.key.txt"));

        write_atomic(&quiz_path, &generated.quiz_text).await?;
        if let Err(e) = write_atomic(&key_path, &generated.answer_key_text).await {
            remove_quiet(&quiz_path).await;
            return Err(e);
        }

        let quiz = Quiz {
            id: Uuid::new_v4(),
            document_id: document.id,
            question_count,
            storage_path: quiz_path.to_string_lossy().into_owned(),
            generated_at: Utc::now(),
        };
        let key = AnswerKey {
            id: Uuid::new_v4(),
            quiz_id: quiz.id,
            storage_path: key_path.to_string_lossy().into_owned(),
        };

        if let Err(e) = self.db.insert_quiz_with_key(&quiz, &key).await {
            remove_quiet(&quiz_path).await;
            remove_quiet(&key_path).await;
            return Err(e);
        }

        Ok((quiz, key))
    }

    /// Removes the quiz pair generated for a document, if one exists.
    /// Returns whether anything was removed. Rows go first, in one
    /// transaction; the files follow, once nothing observable points at
    /// them any more.
    pub async fn delete_for_document(&self, document_id: Uuid) -> PortResult<bool> {
        let Some(quiz) = self.db.find_quiz_by_document(document_id).await? else {
            return Ok(false);
        };
        let key = self
            .db
            .list_answer_keys()
            .await?
            .into_iter()
            .find(|k| k.quiz_id == quiz.id);

        self.db.delete_quiz(quiz.id).await?;

        remove_quiet(Path::new(&quiz.storage_path)).await;
        if let Some(key) = key {
            remove_quiet(Path::new(&key.storage_path)).await;
        }
        Ok(true)
    }

    /// All quizzes in generation order. Answer keys are deliberately not
    /// enumerable here.
    pub async fn list(&self) -> PortResult<Vec<Quiz>> {
        self.db.list_quizzes().await
    }

    /// Returns the quiz text for a quiz file name as shown by `list`.
    pub async fn read(&self, quiz_name: &str) -> PortResult<String> {
        let quiz = self
            .db
            .list_quizzes()
            .await?
            .into_iter()
            .find(|q| artifact_file_name(&q.storage_path) == quiz_name)
            .ok_or_else(|| PortError::NotFound(format!("quiz '{quiz_name}'")))?;

        tokio::fs::read_to_string(&quiz.storage_path)
            .await
            .map_err(|e| PortError::Storage(format!("reading quiz file: {e}")))
    }

    /// Resolves an answer key by its file name, for the grading engine.
    pub async fn resolve_key(&self, key_name: &str) -> PortResult<AnswerKey> {
        self.db
            .list_answer_keys()
            .await?
            .into_iter()
            .find(|k| artifact_file_name(&k.storage_path) == key_name)
            .ok_or_else(|| PortError::NotFound(format!("answer key '{key_name}'")))
    }
}

/// The display name of a stored artifact: its file name.
pub fn artifact_file_name(storage_path: &str) -> String {
    Path::new(storage_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| storage_path.to_string())
}

/// Writes a file via a temp path renamed into place, so a crash mid-write
/// never leaves a half-written artifact under the final name.
async fn write_atomic(path: &Path, contents: &str) -> PortResult<()> {
    let tmp: PathBuf = path.with_extension("tmp");
    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| PortError::Storage(format!("writing {}: {e}", tmp.display())))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| PortError::Storage(format!("renaming into {}: {e}", path.display())))
}

async fn remove_quiet(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("failed to remove {}: {e}", path.display());
        }
    }
}
