//! services/cli/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use classdocs_core::domain::{
    AnswerKey, AuthSession, Document, DocumentKind, Quiz, Role, User, UserCredentials,
};
use classdocs_core::ports::{DatabaseService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn storage_err(e: impl std::fmt::Display) -> PortError {
    PortError::Storage(e.to_string())
}

fn parse_uuid(value: &str) -> PortResult<Uuid> {
    Uuid::parse_str(value).map_err(storage_err)
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: String,
    name: String,
    email: String,
    role: String,
    password_hash: String,
}

impl UserRecord {
    fn to_credentials(self) -> PortResult<UserCredentials> {
        Ok(UserCredentials {
            id: parse_uuid(&self.id)?,
            name: self.name,
            email: self.email,
            role: Role::from_str(&self.role).map_err(PortError::Storage)?,
            password_hash: self.password_hash,
        })
    }

    fn to_domain(self) -> PortResult<User> {
        self.to_credentials().map(UserCredentials::into_user)
    }
}

#[derive(FromRow)]
struct SessionRecord {
    id: String,
    user_id: String,
    established_at: DateTime<Utc>,
}

impl SessionRecord {
    fn to_domain(self) -> PortResult<AuthSession> {
        Ok(AuthSession {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            established_at: self.established_at,
        })
    }
}

#[derive(FromRow)]
struct DocumentRecord {
    id: String,
    name: String,
    owner_id: String,
    storage_path: String,
    kind: String,
    uploaded_at: DateTime<Utc>,
}

impl DocumentRecord {
    fn to_domain(self) -> PortResult<Document> {
        Ok(Document {
            id: parse_uuid(&self.id)?,
            name: self.name,
            owner_id: parse_uuid(&self.owner_id)?,
            storage_path: self.storage_path,
            kind: DocumentKind::from_str(&self.kind).map_err(PortError::Storage)?,
            uploaded_at: self.uploaded_at,
        })
    }
}

#[derive(FromRow)]
struct QuizRecord {
    id: String,
    document_id: String,
    question_count: i64,
    storage_path: String,
    generated_at: DateTime<Utc>,
}

impl QuizRecord {
    fn to_domain(self) -> PortResult<Quiz> {
        Ok(Quiz {
            id: parse_uuid(&self.id)?,
            document_id: parse_uuid(&self.document_id)?,
            question_count: self.question_count as u32,
            storage_path: self.storage_path,
            generated_at: self.generated_at,
        })
    }
}

#[derive(FromRow)]
struct AnswerKeyRecord {
    id: String,
    quiz_id: String,
    storage_path: String,
}

impl AnswerKeyRecord {
    fn to_domain(self) -> PortResult<AnswerKey> {
        Ok(AnswerKey {
            id: parse_uuid(&self.id)?,
            quiz_id: parse_uuid(&self.quiz_id)?,
            storage_path: self.storage_path,
        })
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        role: Role,
        password_hash: &str,
    ) -> PortResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            role,
        };

        sqlx::query(
            "INSERT INTO users (id, name, email, role, password_hash, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::InvalidArgument(format!("email '{email}' is already registered"))
            }
            _ => storage_err(e),
        })?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, role, password_hash FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        record.map(UserRecord::to_credentials).transpose()
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, role, password_hash FROM users WHERE id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        record.map(UserRecord::to_domain).transpose()
    }

    async fn count_admins(&self) -> PortResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)
    }

    async fn replace_session(&self, session: &AuthSession) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query("DELETE FROM auth_sessions")
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        sqlx::query("INSERT INTO auth_sessions (id, user_id, established_at) VALUES (?, ?, ?)")
            .bind(session.id.to_string())
            .bind(session.user_id.to_string())
            .bind(session.established_at)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)
    }

    async fn find_session(&self, session_id: Uuid) -> PortResult<Option<AuthSession>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, user_id, established_at FROM auth_sessions WHERE id = ?",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        record.map(SessionRecord::to_domain).transpose()
    }

    async fn delete_session(&self, session_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn insert_document(&self, document: &Document) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO documents (id, name, owner_id, storage_path, kind, uploaded_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(document.id.to_string())
        .bind(&document.name)
        .bind(document.owner_id.to_string())
        .bind(&document.storage_path)
        .bind(document.kind.as_str())
        .bind(document.uploaded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::DuplicateName(document.name.clone())
            }
            _ => storage_err(e),
        })?;
        Ok(())
    }

    async fn find_document_by_name(&self, name: &str) -> PortResult<Option<Document>> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, name, owner_id, storage_path, kind, uploaded_at \
             FROM documents WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        record.map(DocumentRecord::to_domain).transpose()
    }

    async fn list_documents(&self) -> PortResult<Vec<Document>> {
        let records = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, name, owner_id, storage_path, kind, uploaded_at \
             FROM documents ORDER BY uploaded_at ASC, name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        records.into_iter().map(DocumentRecord::to_domain).collect()
    }

    async fn delete_document(&self, document_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(document_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn insert_quiz_with_key(&self, quiz: &Quiz, key: &AnswerKey) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query(
            "INSERT INTO quizzes (id, document_id, question_count, storage_path, generated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(quiz.id.to_string())
        .bind(quiz.document_id.to_string())
        .bind(quiz.question_count as i64)
        .bind(&quiz.storage_path)
        .bind(quiz.generated_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        sqlx::query("INSERT INTO answer_keys (id, quiz_id, storage_path) VALUES (?, ?, ?)")
            .bind(key.id.to_string())
            .bind(key.quiz_id.to_string())
            .bind(&key.storage_path)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)
    }

    async fn delete_quiz(&self, quiz_id: Uuid) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query("DELETE FROM answer_keys WHERE quiz_id = ?")
            .bind(quiz_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        sqlx::query("DELETE FROM quizzes WHERE id = ?")
            .bind(quiz_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)
    }

    async fn list_quizzes(&self) -> PortResult<Vec<Quiz>> {
        let records = sqlx::query_as::<_, QuizRecord>(
            "SELECT id, document_id, question_count, storage_path, generated_at \
             FROM quizzes ORDER BY generated_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        records.into_iter().map(QuizRecord::to_domain).collect()
    }

    async fn find_quiz_by_document(&self, document_id: Uuid) -> PortResult<Option<Quiz>> {
        let record = sqlx::query_as::<_, QuizRecord>(
            "SELECT id, document_id, question_count, storage_path, generated_at \
             FROM quizzes WHERE document_id = ?",
        )
        .bind(document_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        record.map(QuizRecord::to_domain).transpose()
    }

    async fn list_answer_keys(&self) -> PortResult<Vec<AnswerKey>> {
        let records = sqlx::query_as::<_, AnswerKeyRecord>(
            "SELECT id, quiz_id, storage_path FROM answer_keys",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        records
            .into_iter()
            .map(AnswerKeyRecord::to_domain)
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::memory_adapter;
    use super::*;

    async fn sample_user(db: &DbAdapter, email: &str, role: Role) -> User {
        db.create_user("Sam Poe", email, role, "hash").await.unwrap()
    }

    fn sample_document(owner: &User, name: &str) -> Document {
        Document {
            id: Uuid::new_v4(),
            name: name.to_string(),
            owner_id: owner.id,
            storage_path: format!("docs/{name}"),
            kind: DocumentKind::Text,
            uploaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_and_find_user_by_email() {
        let db = memory_adapter().await;
        let user = sample_user(&db, "poe@example.edu", Role::Teacher).await;

        let creds = db
            .find_user_by_email("poe@example.edu")
            .await
            .unwrap()
            .expect("user exists");
        assert_eq!(creds.id, user.id);
        assert_eq!(creds.role, Role::Teacher);
        assert_eq!(creds.password_hash, "hash");

        assert!(db.find_user_by_email("nobody@example.edu").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let db = memory_adapter().await;
        sample_user(&db, "poe@example.edu", Role::Teacher).await;

        let err = db
            .create_user("Other", "poe@example.edu", Role::Student, "h2")
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn count_admins_only_counts_admins() {
        let db = memory_adapter().await;
        assert_eq!(db.count_admins().await.unwrap(), 0);
        sample_user(&db, "t@example.edu", Role::Teacher).await;
        sample_user(&db, "a@example.edu", Role::Admin).await;
        assert_eq!(db.count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn replace_session_keeps_a_single_row() {
        let db = memory_adapter().await;
        let alice = sample_user(&db, "alice@example.edu", Role::Teacher).await;
        let bob = sample_user(&db, "bob@example.edu", Role::Student).await;

        let first = AuthSession {
            id: Uuid::new_v4(),
            user_id: alice.id,
            established_at: Utc::now(),
        };
        db.replace_session(&first).await.unwrap();

        let second = AuthSession {
            id: Uuid::new_v4(),
            user_id: bob.id,
            established_at: Utc::now(),
        };
        db.replace_session(&second).await.unwrap();

        // The first session no longer resolves; the second does.
        assert!(db.find_session(first.id).await.unwrap().is_none());
        let found = db.find_session(second.id).await.unwrap().expect("live session");
        assert_eq!(found.user_id, bob.id);
    }

    #[tokio::test]
    async fn document_lifecycle_round_trip() {
        let db = memory_adapter().await;
        let owner = sample_user(&db, "t@example.edu", Role::Teacher).await;

        let doc = sample_document(&owner, "syllabus.txt");
        db.insert_document(&doc).await.unwrap();

        let found = db
            .find_document_by_name("syllabus.txt")
            .await
            .unwrap()
            .expect("document exists");
        assert_eq!(found.id, doc.id);
        assert_eq!(found.kind, DocumentKind::Text);

        let err = db.insert_document(&sample_document(&owner, "syllabus.txt")).await.unwrap_err();
        assert!(matches!(err, PortError::DuplicateName(_)));

        db.delete_document(doc.id).await.unwrap();
        assert!(db.find_document_by_name("syllabus.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn quiz_and_key_commit_together_or_not_at_all() {
        let db = memory_adapter().await;
        let owner = sample_user(&db, "t@example.edu", Role::Teacher).await;
        let doc = sample_document(&owner, "syllabus.txt");
        db.insert_document(&doc).await.unwrap();

        let quiz = Quiz {
            id: Uuid::new_v4(),
            document_id: doc.id,
            question_count: 3,
            storage_path: "quizzes/syllabus.txt.quiz.txt".to_string(),
            generated_at: Utc::now(),
        };
        let key = AnswerKey {
            id: Uuid::new_v4(),
            quiz_id: quiz.id,
            storage_path: "answer_keys/syllabus.txt.key.txt".to_string(),
        };
        db.insert_quiz_with_key(&quiz, &key).await.unwrap();
        assert_eq!(db.list_quizzes().await.unwrap().len(), 1);
        assert_eq!(db.list_answer_keys().await.unwrap().len(), 1);

        // A second pair whose key collides on quiz_id must leave no trace of
        // either half.
        let second_quiz = Quiz {
            id: Uuid::new_v4(),
            document_id: doc.id,
            question_count: 2,
            storage_path: "quizzes/second.quiz.txt".to_string(),
            generated_at: Utc::now(),
        };
        let colliding_key = AnswerKey {
            id: Uuid::new_v4(),
            quiz_id: quiz.id,
            storage_path: "answer_keys/second.key.txt".to_string(),
        };
        let err = db.insert_quiz_with_key(&second_quiz, &colliding_key).await.unwrap_err();
        assert!(matches!(err, PortError::Storage(_)));

        assert_eq!(db.list_quizzes().await.unwrap().len(), 1);
        assert_eq!(db.list_answer_keys().await.unwrap().len(), 1);
    }
}
