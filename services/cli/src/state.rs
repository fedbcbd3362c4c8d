//! services/cli/src/state.rs
//!
//! Defines the application's shared state: the wired-up service ports plus
//! configuration and the managed directory layout. Built once in the binary
//! and passed explicitly to the dispatcher; there is no ambient global
//! session state.

use std::sync::Arc;

use classdocs_core::ports::{
    DatabaseService, GenerationService, PortError, PortResult, TextExtractionService,
};

use crate::config::Config;
use crate::layout::DirLayout;
use crate::session::SessionManager;
use crate::store::{DocumentStore, QuizStore};

/// The shared application state, created once at startup and passed to the
/// command dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    /// `None` when no generation credential is configured; commands that
    /// need it fail fast with `MissingCredential` before any state mutation.
    pub generator: Option<Arc<dyn GenerationService>>,
    pub extractor: Arc<dyn TextExtractionService>,
    pub config: Arc<Config>,
    pub layout: DirLayout,
}

impl AppState {
    pub fn session(&self) -> SessionManager {
        SessionManager::new(self.db.clone(), self.layout.session_file.clone())
    }

    pub fn documents(&self) -> DocumentStore {
        DocumentStore::new(self.db.clone(), self.layout.clone())
    }

    pub fn quizzes(&self) -> QuizStore {
        QuizStore::new(self.db.clone(), self.layout.clone(), self.extractor.clone())
    }

    /// The generation collaborator, or `MissingCredential` when the
    /// environment provides no API key.
    pub fn generator(&self) -> PortResult<Arc<dyn GenerationService>> {
        self.generator
            .clone()
            .ok_or_else(|| PortError::MissingCredential("OPENAI_API_KEY is not set".to_string()))
    }
}
