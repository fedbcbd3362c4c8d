pub mod domain;
pub mod grading;
pub mod permissions;
pub mod ports;

pub use domain::{
    AnswerKey, AuthSession, Document, DocumentKind, GeneratedQuiz, Quiz, Role, User,
    UserCredentials,
};
pub use grading::{grade, parse_answers, AnswerEntry, GradeReport, QuestionResult};
pub use permissions::{allowed, require, CommandKind};
pub use ports::{DatabaseService, GenerationService, PortError, PortResult, TextExtractionService};
