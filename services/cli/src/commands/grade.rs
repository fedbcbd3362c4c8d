//! services/cli/src/commands/grade.rs
//!
//! Grading a student response file against a stored answer key.

use std::path::Path;

use classdocs_core::grading::{self, GradeReport};
use classdocs_core::ports::{PortError, PortResult};

use crate::error::CliError;
use crate::output::print_warning;
use crate::state::AppState;

/// Resolves the key, parses both files and produces the report. Malformed
/// lines in either file become warnings on the report, never errors.
pub async fn run_grade(
    state: &AppState,
    response_file: &Path,
    key_name: &str,
) -> PortResult<GradeReport> {
    let key = state.quizzes().resolve_key(key_name).await?;

    let key_text = tokio::fs::read_to_string(&key.storage_path)
        .await
        .map_err(|e| PortError::Storage(format!("reading answer key: {e}")))?;
    let response_text = tokio::fs::read_to_string(response_file)
        .await
        .map_err(|e| {
            PortError::NotFound(format!("response file '{}': {e}", response_file.display()))
        })?;

    let key_answers = grading::parse_answers(&key_text);
    let response_answers = grading::parse_answers(&response_text);

    let mut report = grading::grade(&key_answers.entries, &response_answers.entries);
    report.warnings = key_answers
        .warnings
        .into_iter()
        .map(|w| format!("answer key: {w}"))
        .chain(
            response_answers
                .warnings
                .into_iter()
                .map(|w| format!("response: {w}")),
        )
        .collect();

    Ok(report)
}

pub async fn grade(state: &AppState, response_file: &Path, key_name: &str) -> Result<(), CliError> {
    let report = run_grade(state, response_file, key_name).await?;

    for warning in &report.warnings {
        print_warning(warning);
    }

    println!("Score: {}/{}", report.correct_count, report.total);
    println!("Question breakdown:");
    for result in &report.results {
        let given = result
            .given
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = if result.correct {
            "Correct".to_string()
        } else {
            format!("Incorrect (Correct: {})", result.expected)
        };
        println!(" {}. Your: {} | {}", result.number, given, status);
    }
    for extra in &report.extra_responses {
        println!(
            " {}. Your: {} | Not in answer key",
            extra.number, extra.option
        );
    }

    Ok(())
}
