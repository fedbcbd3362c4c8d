//! services/cli/src/commands/mod.rs
//!
//! The command-line surface and the dispatcher. Each subcommand maps 1:1
//! onto a `CommandKind` from the permission matrix. Dispatch order is
//! fixed: resolve the session first, then consult the matrix, then invoke
//! the manager. An unauthenticated caller always sees `NotAuthenticated`,
//! never `PermissionDenied`.

pub mod auth;
pub mod docs;
pub mod grade;
pub mod quizzes;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use classdocs_core::domain::User;
use classdocs_core::permissions::{self, CommandKind};
use classdocs_core::ports::PortResult;

use crate::error::CliError;
use crate::output::OutputFormat;
use crate::state::AppState;
use crate::store::DEFAULT_QUESTION_COUNT;

/// Classroom document tool: readings, summaries, quizzes and grading.
#[derive(Debug, Parser)]
#[command(name = "classdocs", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format for list commands
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register a new user: <name> <email> <role>
    Register {
        name: String,
        email: String,
        /// One of: admin, teacher, student
        role: String,
        /// Password (will prompt if not provided)
        #[arg(long)]
        password: Option<String>,
    },
    /// Log in as an existing user
    Login {
        email: String,
        /// Password (will prompt if not provided)
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out the current user
    Logout,
    /// Show the currently authenticated user
    Whoami,
    /// Upload a document (PDF or plain text)
    Upload { file: PathBuf },
    /// Delete an uploaded document and its file
    DeleteDoc { name: String },
    /// Generate a summary of a document
    Summarize { name: String },
    /// Generate a quiz and its answer key from a document
    Quiz {
        name: String,
        /// Number of quiz questions
        #[arg(long, default_value_t = DEFAULT_QUESTION_COUNT)]
        n: u32,
    },
    /// List uploaded documents
    ListDocs,
    /// List generated quizzes
    ListQuizzes,
    /// Print a quiz's questions
    ReadQuiz { name: String },
    /// Grade a response file against an answer key
    Grade {
        response_file: PathBuf,
        key_name: String,
    },
}

impl Command {
    /// The permission-matrix identity of this subcommand.
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Register { .. } => CommandKind::Register,
            Command::Login { .. } => CommandKind::Login,
            Command::Logout => CommandKind::Logout,
            Command::Whoami => CommandKind::Whoami,
            Command::Upload { .. } => CommandKind::Upload,
            Command::DeleteDoc { .. } => CommandKind::DeleteDoc,
            Command::Summarize { .. } => CommandKind::Summarize,
            Command::Quiz { .. } => CommandKind::Quiz,
            Command::ListDocs => CommandKind::ListDocs,
            Command::ListQuizzes => CommandKind::ListQuizzes,
            Command::ReadQuiz { .. } => CommandKind::ReadQuiz,
            Command::Grade { .. } => CommandKind::Grade,
        }
    }
}

/// Resolves the session and checks the matrix, in that order.
pub async fn authorize(state: &AppState, kind: CommandKind) -> PortResult<User> {
    let user = state.session().require_current().await?;
    permissions::require(user.role, kind)?;
    Ok(user)
}

/// Executes one parsed invocation against the application state.
pub async fn dispatch(state: &AppState, cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Public commands: no session required. Registration enforces its
        // own policy (self-registration vs admin-gated) internally.
        Command::Register {
            name,
            email,
            role,
            password,
        } => auth::register(state, &name, &email, &role, password).await,
        Command::Login { email, password } => auth::login(state, &email, password).await,

        // Everything else resolves the session before the matrix.
        command => {
            let user = authorize(state, command.kind()).await?;
            match command {
                Command::Logout => auth::logout(state).await,
                Command::Whoami => auth::whoami(&user).await,
                Command::Upload { file } => docs::upload(state, &user, &file).await,
                Command::DeleteDoc { name } => docs::delete(state, &name).await,
                Command::Summarize { name } => docs::summarize(state, &name).await,
                Command::Quiz { name, n } => quizzes::generate(state, &name, n).await,
                Command::ListDocs => docs::list(state, cli.format).await,
                Command::ListQuizzes => quizzes::list(state, cli.format).await,
                Command::ReadQuiz { name } => quizzes::read(state, &name).await,
                Command::Grade {
                    response_file,
                    key_name,
                } => grade::grade(state, &response_file, &key_name).await,
                Command::Register { .. } | Command::Login { .. } => unreachable!(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::db::test_support::memory_adapter;
    use crate::adapters::FileTextExtractor;
    use crate::config::Config;
    use crate::layout::DirLayout;
    use async_trait::async_trait;
    use classdocs_core::domain::{GeneratedQuiz, Role};
    use classdocs_core::ports::{GenerationService, PortError};
    use std::sync::Arc;

    struct StubGenerator;

    #[async_trait]
    impl GenerationService for StubGenerator {
        async fn summarize(&self, _document_text: &str) -> PortResult<String> {
            Ok("a short summary".to_string())
        }

        async fn generate_quiz(
            &self,
            _document_text: &str,
            question_count: u32,
        ) -> PortResult<GeneratedQuiz> {
            let quiz_text = (1..=question_count)
                .map(|n| format!("{n}. Question {n}?\nA) yes\nB) no\nC) maybe\nD) unsure\n"))
                .collect::<Vec<_>>()
                .join("\n");
            let answer_key_text = (1..=question_count)
                .map(|n| format!("{n}: A"))
                .collect::<Vec<_>>()
                .join("\n");
            Ok(GeneratedQuiz {
                quiz_text,
                answer_key_text,
            })
        }
    }

    async fn test_state(dir: &tempfile::TempDir) -> AppState {
        let layout = DirLayout::new(dir.path());
        layout.ensure().await.unwrap();
        AppState {
            db: Arc::new(memory_adapter().await),
            generator: Some(Arc::new(StubGenerator)),
            extractor: Arc::new(FileTextExtractor),
            config: Arc::new(Config {
                data_dir: dir.path().to_path_buf(),
                database_url: "sqlite::memory:".to_string(),
                log_level: tracing::Level::WARN,
                openai_api_key: None,
                summary_model: "stub".to_string(),
                quiz_model: "stub".to_string(),
            }),
            layout,
        }
    }

    #[tokio::test]
    async fn unauthenticated_callers_never_see_permission_denied() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        for kind in [CommandKind::Upload, CommandKind::ListDocs, CommandKind::Grade] {
            let err = authorize(&state, kind).await.unwrap_err();
            assert!(matches!(err, PortError::NotAuthenticated), "kind {kind}");
        }
    }

    #[tokio::test]
    async fn students_are_denied_mutating_commands_after_login() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        auth::register_user(&state, "Sam", "sam@example.edu", Role::Student, "pw")
            .await
            .unwrap();
        state.session().login("sam@example.edu", "pw").await.unwrap();

        let err = authorize(&state, CommandKind::Upload).await.unwrap_err();
        assert!(matches!(err, PortError::PermissionDenied { .. }));

        // Read-side commands stay open to students.
        assert!(authorize(&state, CommandKind::ListQuizzes).await.is_ok());
        assert!(authorize(&state, CommandKind::Summarize).await.is_ok());
    }

    #[tokio::test]
    async fn registration_policy_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        // Bootstrap: the first admin registers unauthenticated.
        auth::register_user(&state, "Root", "root@example.edu", Role::Admin, "pw")
            .await
            .unwrap();

        // A second admin is refused even for the admin itself.
        state.session().login("root@example.edu", "pw").await.unwrap();
        let err = auth::register_user(&state, "R2", "r2@example.edu", Role::Admin, "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::InvalidArgument(_)));

        // Admin registers a teacher.
        auth::register_user(&state, "Poe", "poe@example.edu", Role::Teacher, "pw")
            .await
            .unwrap();

        // An unauthenticated caller cannot register a teacher...
        state.session().logout().await.unwrap();
        let err = auth::register_user(&state, "X", "x@example.edu", Role::Teacher, "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotAuthenticated));

        // ...but student self-registration stays public.
        auth::register_user(&state, "Sam", "sam@example.edu", Role::Student, "pw")
            .await
            .unwrap();

        // A logged-in student cannot register a teacher.
        state.session().login("sam@example.edu", "pw").await.unwrap();
        let err = auth::register_user(&state, "Y", "y@example.edu", Role::Teacher, "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn end_to_end_classroom_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;
        let session = state.session();

        // Admin bootstraps and registers a teacher.
        auth::register_user(&state, "Root", "root@example.edu", Role::Admin, "pw")
            .await
            .unwrap();
        session.login("root@example.edu", "pw").await.unwrap();
        auth::register_user(&state, "Poe", "poe@example.edu", Role::Teacher, "pw")
            .await
            .unwrap();

        // Teacher logs in (replacing the admin session) and uploads.
        let teacher = session.login("poe@example.edu", "pw").await.unwrap();
        let source = dir.path().join("syllabus.txt");
        tokio::fs::write(&source, "week 1: intro\n").await.unwrap();
        let authorized = authorize(&state, CommandKind::Upload).await.unwrap();
        assert_eq!(authorized.id, teacher.id);
        state.documents().upload(&source, &authorized).await.unwrap();

        // Teacher generates a 3-question quiz through the dispatcher.
        dispatch(
            &state,
            Cli {
                command: Command::Quiz {
                    name: "syllabus.txt".to_string(),
                    n: 3,
                },
                format: OutputFormat::Table,
            },
        )
        .await
        .unwrap();

        // A student registers, logs in, and sees the quiz but no keys.
        auth::register_user(&state, "Sam", "sam@example.edu", Role::Student, "pw")
            .await
            .unwrap();
        session.login("sam@example.edu", "pw").await.unwrap();
        authorize(&state, CommandKind::ListQuizzes).await.unwrap();
        let quizzes = state.quizzes().list().await.unwrap();
        assert_eq!(quizzes.len(), 1);
        let quiz_text = state.quizzes().read("syllabus.txt.quiz.txt").await.unwrap();
        assert!(!quiz_text.contains("Answer Key"));

        // Teacher grades a hand-written response: 2 of 3 correct (stub key
        // is all A), question 3 unanswered.
        session.login("poe@example.edu", "pw").await.unwrap();
        let response = dir.path().join("student_responses").join("sam.txt");
        tokio::fs::write(&response, "1: A\n2: a\n").await.unwrap();

        authorize(&state, CommandKind::Grade).await.unwrap();
        let report = grade::run_grade(&state, &response, "syllabus.txt.key.txt")
            .await
            .unwrap();
        assert_eq!(report.total, 3);
        assert_eq!(report.correct_count, 2);
        assert_eq!(report.results[2].given, None);

        // After logout, gated commands report NotAuthenticated.
        session.logout().await.unwrap();
        let err = authorize(&state, CommandKind::ListDocs).await.unwrap_err();
        assert!(matches!(err, PortError::NotAuthenticated));
    }

    #[tokio::test]
    async fn missing_generation_credential_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = test_state(&dir).await;
        state.generator = None;

        auth::register_user(&state, "Root", "root@example.edu", Role::Admin, "pw")
            .await
            .unwrap();
        state.session().login("root@example.edu", "pw").await.unwrap();

        let err = dispatch(
            &state,
            Cli {
                command: Command::Quiz {
                    name: "anything.txt".to_string(),
                    n: 3,
                },
                format: OutputFormat::Table,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Port(PortError::MissingCredential(_))
        ));
    }
}
