//! services/cli/src/layout.rs
//!
//! The managed directory tree. Each subdirectory is written by exactly one
//! store: `docs/` by the document store, `quizzes/` and `answer_keys/` by
//! the quiz store. `student_responses/` is a conventional drop location for
//! response files; grading accepts any readable path.

use std::io;
use std::path::{Path, PathBuf};

/// Fixed filesystem layout rooted at the data directory.
#[derive(Debug, Clone)]
pub struct DirLayout {
    pub docs: PathBuf,
    pub quizzes: PathBuf,
    pub answer_keys: PathBuf,
    pub student_responses: PathBuf,
    /// Marker file holding the current session id.
    pub session_file: PathBuf,
}

impl DirLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            docs: root.join("docs"),
            quizzes: root.join("quizzes"),
            answer_keys: root.join("answer_keys"),
            student_responses: root.join("student_responses"),
            session_file: root.join("session"),
        }
    }

    /// Creates every managed directory. Safe to call on every start.
    pub async fn ensure(&self) -> io::Result<()> {
        for dir in [
            &self.docs,
            &self.quizzes,
            &self.answer_keys,
            &self.student_responses,
        ] {
            tokio::fs::create_dir_all(dir).await?;
        }
        Ok(())
    }
}
