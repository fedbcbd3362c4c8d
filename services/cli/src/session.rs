//! services/cli/src/session.rs
//!
//! The session manager: login, logout and current-user resolution for the
//! single durable session. The database row is authoritative; a marker file
//! under the data dir holds the session id between invocations, playing the
//! part a cookie would in a web service.
//!
//! Re-login policy: a second login REPLACES the existing session. The prior
//! identity is logged out as part of the same database transaction.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use classdocs_core::domain::{AuthSession, User};
use classdocs_core::ports::{DatabaseService, PortError, PortResult};

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| PortError::Storage(format!("failed to hash password: {e}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Tracks the single authenticated identity across command invocations.
pub struct SessionManager {
    db: Arc<dyn DatabaseService>,
    marker_path: PathBuf,
}

impl SessionManager {
    pub fn new(db: Arc<dyn DatabaseService>, marker_path: PathBuf) -> Self {
        Self { db, marker_path }
    }

    /// Verifies the credential and establishes a new session, replacing any
    /// existing one. Unknown email and wrong password are indistinguishable
    /// to the caller.
    pub async fn login(&self, email: &str, password: &str) -> PortResult<User> {
        let creds = self
            .db
            .find_user_by_email(email)
            .await?
            .ok_or(PortError::InvalidCredential)?;

        if !verify_password(password, &creds.password_hash) {
            return Err(PortError::InvalidCredential);
        }

        let session = AuthSession {
            id: Uuid::new_v4(),
            user_id: creds.id,
            established_at: Utc::now(),
        };
        self.db.replace_session(&session).await?;
        self.write_marker(session.id).await?;

        Ok(creds.into_user())
    }

    /// Destroys the current session. Returns `false` when no session was
    /// active (not an error, matching the tool's conversational surface).
    pub async fn logout(&self) -> PortResult<bool> {
        let Some(session_id) = self.read_marker().await? else {
            return Ok(false);
        };
        self.db.delete_session(session_id).await?;
        self.remove_marker().await?;
        Ok(true)
    }

    /// Resolves the currently-authenticated user, if any. A marker that no
    /// longer matches a session row is stale (e.g. the row was replaced by a
    /// later login) and is cleaned up here.
    pub async fn current(&self) -> PortResult<Option<User>> {
        let Some(session_id) = self.read_marker().await? else {
            return Ok(None);
        };

        let Some(session) = self.db.find_session(session_id).await? else {
            self.remove_marker().await?;
            return Ok(None);
        };

        match self.db.get_user(session.user_id).await? {
            Some(user) => Ok(Some(user)),
            None => {
                // Session row points at a deleted user; treat as logged out.
                self.db.delete_session(session.id).await?;
                self.remove_marker().await?;
                Ok(None)
            }
        }
    }

    /// The current user, or `NotAuthenticated`.
    pub async fn require_current(&self) -> PortResult<User> {
        self.current().await?.ok_or(PortError::NotAuthenticated)
    }

    async fn read_marker(&self) -> PortResult<Option<Uuid>> {
        let raw = match tokio::fs::read_to_string(&self.marker_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PortError::Storage(format!("reading session marker: {e}"))),
        };

        match Uuid::parse_str(raw.trim()) {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                warn!("session marker is corrupt; treating as logged out");
                self.remove_marker().await?;
                Ok(None)
            }
        }
    }

    async fn write_marker(&self, session_id: Uuid) -> PortResult<()> {
        tokio::fs::write(&self.marker_path, session_id.to_string())
            .await
            .map_err(|e| PortError::Storage(format!("writing session marker: {e}")))
    }

    async fn remove_marker(&self) -> PortResult<()> {
        match tokio::fs::remove_file(&self.marker_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Storage(format!("removing session marker: {e}"))),
        }
    }
}
