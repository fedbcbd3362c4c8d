//! services/cli/src/commands/quizzes.rs
//!
//! Quiz generation, listing and reading.

use serde::Serialize;
use std::collections::HashMap;
use tabled::Tabled;
use uuid::Uuid;

use crate::error::CliError;
use crate::output::{print_list, print_success, OutputFormat};
use crate::state::AppState;
use crate::store::artifact_file_name;

/// Quiz display row for table output
#[derive(Debug, Serialize, Tabled)]
struct QuizRow {
    quiz: String,
    document: String,
    questions: u32,
    generated_at: String,
}

pub async fn generate(state: &AppState, name: &str, question_count: u32) -> Result<(), CliError> {
    // Fail fast on a missing credential before touching any state.
    let generator = state.generator()?;

    let (quiz, key) = state
        .quizzes()
        .generate(generator.as_ref(), name, question_count)
        .await?;

    print_success(&format!(
        "Generated {} with answer key {}.",
        artifact_file_name(&quiz.storage_path),
        artifact_file_name(&key.storage_path),
    ));
    Ok(())
}

pub async fn list(state: &AppState, format: OutputFormat) -> Result<(), CliError> {
    let quizzes = state.quizzes().list().await?;

    let documents: HashMap<Uuid, String> = state
        .documents()
        .list()
        .await?
        .into_iter()
        .map(|d| (d.id, d.name))
        .collect();

    let rows: Vec<QuizRow> = quizzes
        .iter()
        .map(|q| QuizRow {
            quiz: artifact_file_name(&q.storage_path),
            document: documents.get(&q.document_id).cloned().unwrap_or_default(),
            questions: q.question_count,
            generated_at: q.generated_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();

    print_list(&rows, format);
    Ok(())
}

pub async fn read(state: &AppState, name: &str) -> Result<(), CliError> {
    let contents = state.quizzes().read(name).await?;
    println!("{contents}");
    Ok(())
}
