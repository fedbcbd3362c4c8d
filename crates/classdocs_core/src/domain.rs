//! crates/classdocs_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The role attached to a user account. Determines which commands the
/// permission matrix allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

// Represents a user account - used throughout the app
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

impl UserCredentials {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role,
        }
    }
}

/// The single authenticated identity persisted between invocations.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub established_at: DateTime<Utc>,
}

/// The physical format of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    /// Maps a lowercase file extension onto a supported kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(DocumentKind::Pdf),
            "txt" => Some(DocumentKind::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Text => "text",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(DocumentKind::Pdf),
            "text" => Ok(DocumentKind::Text),
            other => Err(format!("unknown document kind '{other}'")),
        }
    }
}

/// Represents a reading uploaded by a teacher or admin.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub storage_path: String,
    pub kind: DocumentKind,
    pub uploaded_at: DateTime<Utc>,
}

/// A generated quiz tied to a source document. Always created together
/// with its [`AnswerKey`]; neither exists without the other.
#[derive(Debug, Clone)]
pub struct Quiz {
    pub id: Uuid,
    pub document_id: Uuid,
    pub question_count: u32,
    pub storage_path: String,
    pub generated_at: DateTime<Utc>,
}

/// The scoring reference paired 1:1 with a generated quiz.
#[derive(Debug, Clone)]
pub struct AnswerKey {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub storage_path: String,
}

/// The raw artifact pair returned by the generation collaborator before
/// either half is persisted.
#[derive(Debug, Clone)]
pub struct GeneratedQuiz {
    pub quiz_text: String,
    pub answer_key_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Admin, Role::Teacher, Role::Student] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn document_kind_from_extension() {
        assert_eq!(DocumentKind::from_extension("pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_extension("txt"), Some(DocumentKind::Text));
        assert_eq!(DocumentKind::from_extension("docx"), None);
    }
}
