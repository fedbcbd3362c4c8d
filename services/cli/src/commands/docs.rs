//! services/cli/src/commands/docs.rs
//!
//! Document upload, listing, deletion and summaries.

use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tabled::Tabled;
use uuid::Uuid;

use classdocs_core::domain::User;
use classdocs_core::ports::{DatabaseService, GenerationService, TextExtractionService};

use crate::error::CliError;
use crate::output::{print_list, print_success, OutputFormat};
use crate::state::AppState;

/// Document display row for table output
#[derive(Debug, Serialize, Tabled)]
struct DocumentRow {
    name: String,
    owner: String,
    kind: String,
    uploaded_at: String,
}

pub async fn upload(state: &AppState, user: &User, file: &Path) -> Result<(), CliError> {
    let document = state.documents().upload(file, user).await?;
    print_success(&format!(
        "Uploaded {} and metadata recorded.",
        document.storage_path
    ));
    Ok(())
}

pub async fn delete(state: &AppState, name: &str) -> Result<(), CliError> {
    let document = state.documents().resolve(name).await?;

    // A generated quiz pins its source document; remove the pair first so
    // the store-level delete cannot strand it.
    if state.quizzes().delete_for_document(document.id).await? {
        print_success(&format!("Removed the quiz and answer key for {name}."));
    }

    state.documents().delete(name).await?;
    print_success(&format!("Deleted {name}."));
    Ok(())
}

pub async fn list(state: &AppState, format: OutputFormat) -> Result<(), CliError> {
    let documents = state.documents().list().await?;

    // Resolve owner ids to emails once for display.
    let mut owners: HashMap<Uuid, String> = HashMap::new();
    for doc in &documents {
        if !owners.contains_key(&doc.owner_id) {
            let email = state
                .db
                .get_user(doc.owner_id)
                .await?
                .map(|u| u.email)
                .unwrap_or_else(|| doc.owner_id.to_string());
            owners.insert(doc.owner_id, email);
        }
    }

    let rows: Vec<DocumentRow> = documents
        .iter()
        .map(|d| DocumentRow {
            name: d.name.clone(),
            owner: owners.get(&d.owner_id).cloned().unwrap_or_default(),
            kind: d.kind.to_string(),
            uploaded_at: d.uploaded_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();

    print_list(&rows, format);
    Ok(())
}

pub async fn summarize(state: &AppState, name: &str) -> Result<(), CliError> {
    // Fail fast on a missing credential before reading anything.
    let generator = state.generator()?;

    let document = state.documents().resolve(name).await?;
    let text = state
        .extractor
        .extract_text(Path::new(&document.storage_path), document.kind)
        .await?;

    let summary = generator.summarize(&text).await?;
    println!("{summary}");
    Ok(())
}
