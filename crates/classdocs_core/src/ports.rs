//! crates/classdocs_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use std::path::Path;
use uuid::Uuid;

use crate::domain::{
    AnswerKey, AuthSession, Document, DocumentKind, GeneratedQuiz, Quiz, Role, User,
    UserCredentials,
};
use crate::permissions::CommandKind;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error taxonomy shared by every port operation and surfaced, with a
/// human-readable message, as the command's failure.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Not logged in. Please `login` first.")]
    NotAuthenticated,
    #[error("Permission denied: role '{role}' may not run `{command}`")]
    PermissionDenied { role: Role, command: CommandKind },
    #[error("Invalid email or password")]
    InvalidCredential,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Duplicate name: {0}")]
    DuplicateName(String),
    #[error("Unsupported format: {0} (only .pdf and .txt are allowed)")]
    UnsupportedFormat(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
    #[error("Missing credential: {0}")]
    MissingCredential(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        role: Role,
        password_hash: &str,
    ) -> PortResult<User>;

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>>;

    async fn get_user(&self, user_id: Uuid) -> PortResult<Option<User>>;

    async fn count_admins(&self) -> PortResult<i64>;

    // --- Session Management ---
    /// Inserts the new session after deleting any existing one, in a single
    /// transaction. This is the durable half of the replace-on-login policy.
    async fn replace_session(&self, session: &AuthSession) -> PortResult<()>;

    async fn find_session(&self, session_id: Uuid) -> PortResult<Option<AuthSession>>;

    async fn delete_session(&self, session_id: Uuid) -> PortResult<()>;

    // --- Document Management ---
    async fn insert_document(&self, document: &Document) -> PortResult<()>;

    async fn find_document_by_name(&self, name: &str) -> PortResult<Option<Document>>;

    async fn list_documents(&self) -> PortResult<Vec<Document>>;

    async fn delete_document(&self, document_id: Uuid) -> PortResult<()>;

    // --- Quiz / Answer-Key Management ---
    /// Persists a quiz together with its answer key in one transaction so a
    /// quiz row is never visible without its key row.
    async fn insert_quiz_with_key(&self, quiz: &Quiz, key: &AnswerKey) -> PortResult<()>;

    /// Removes a quiz row and its answer-key row in one transaction.
    async fn delete_quiz(&self, quiz_id: Uuid) -> PortResult<()>;

    async fn list_quizzes(&self) -> PortResult<Vec<Quiz>>;

    async fn find_quiz_by_document(&self, document_id: Uuid) -> PortResult<Option<Quiz>>;

    async fn list_answer_keys(&self) -> PortResult<Vec<AnswerKey>>;
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Produces a prose summary of the document text.
    async fn summarize(&self, document_text: &str) -> PortResult<String>;

    /// Produces a multiple-choice quiz and its answer key for the document
    /// text. Failures are surfaced as `GenerationFailed`, never retried here.
    async fn generate_quiz(
        &self,
        document_text: &str,
        question_count: u32,
    ) -> PortResult<GeneratedQuiz>;
}

#[async_trait]
pub trait TextExtractionService: Send + Sync {
    /// Extracts plain text from a stored document file.
    async fn extract_text(&self, path: &Path, kind: DocumentKind) -> PortResult<String>;
}
