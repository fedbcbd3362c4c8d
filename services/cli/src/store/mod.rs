pub mod documents;
pub mod quizzes;

pub use documents::DocumentStore;
pub use quizzes::{artifact_file_name, QuizStore, DEFAULT_QUESTION_COUNT};
