//! Proposal rendering abstraction.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{PricedItem, Task};

/// Proposal rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to write proposal artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid artifact reference: {0}")]
    InvalidReference(String),
}

/// Everything a renderer needs to produce a proposal artifact.
#[derive(Debug, Clone, Copy)]
pub struct ProposalDocument<'a> {
    pub task: &'a Task,
    pub items: &'a [PricedItem],
    pub total_value: f64,
    pub margin_percent: f64,
    pub generated_at: DateTime<Utc>,
}

/// Persists rendered proposals and resolves references back to bytes.
#[async_trait::async_trait]
pub trait ProposalRenderer: Send + Sync {
    /// Renders and durably stores the proposal, returning an opaque
    /// reference. On error no retrievable artifact is left behind.
    async fn render(&self, document: &ProposalDocument<'_>) -> Result<String, RenderError>;

    /// Loads a previously rendered artifact, or `None` if it does not exist.
    async fn open(&self, artifact_ref: &str) -> Result<Option<Vec<u8>>, RenderError>;
}
