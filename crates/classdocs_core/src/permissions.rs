//! crates/classdocs_core/src/permissions.rs
//!
//! The declarative permission matrix: a single pure function mapping
//! (role, command) to allow/deny, consulted once per command by the
//! dispatcher before any manager is invoked.

use std::fmt;

use crate::domain::Role;
use crate::ports::PortError;

/// The closed set of dispatcher commands. Everything the CLI surface can
/// invoke maps 1:1 onto one of these; there are no dynamic command strings,
/// so anything outside this enum is denied by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Registration of a teacher or admin account by an admin. Student
    /// self-registration is public and never reaches the matrix.
    Register,
    Login,
    Logout,
    Whoami,
    Upload,
    DeleteDoc,
    Quiz,
    Grade,
    Summarize,
    ListDocs,
    ListQuizzes,
    ReadQuiz,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Register => "register",
            CommandKind::Login => "login",
            CommandKind::Logout => "logout",
            CommandKind::Whoami => "whoami",
            CommandKind::Upload => "upload",
            CommandKind::DeleteDoc => "delete-doc",
            CommandKind::Quiz => "quiz",
            CommandKind::Grade => "grade",
            CommandKind::Summarize => "summarize",
            CommandKind::ListDocs => "list-docs",
            CommandKind::ListQuizzes => "list-quizzes",
            CommandKind::ReadQuiz => "read-quiz",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns whether `role` may run `command`. Pure and total; no side
/// effects.
pub fn allowed(role: Role, command: CommandKind) -> bool {
    use CommandKind::*;
    match command {
        Register => matches!(role, Role::Admin),
        Login | Logout | Whoami => true,
        Upload | DeleteDoc | Quiz | Grade => matches!(role, Role::Admin | Role::Teacher),
        Summarize | ListDocs | ListQuizzes | ReadQuiz => true,
    }
}

/// Checks the matrix and produces the single `PermissionDenied` failure on
/// deny. Callers must have resolved a session first so an unauthenticated
/// caller never sees this error.
pub fn require(role: Role, command: CommandKind) -> Result<(), PortError> {
    if allowed(role, command) {
        Ok(())
    } else {
        Err(PortError::PermissionDenied { role, command })
    }
}
