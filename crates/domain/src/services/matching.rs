//! Boundary to the external matching engine.
//!
//! The engine is a black box: it is handed the path of a stored source
//! document and returns the candidate catalog matches for it. Engines may
//! block; callers are expected to run them off the async executor.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::Match;

/// Matching engine errors.
#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("Failed to read document {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document could not be processed: {0}")]
    Processing(String),
}

/// Converts a source document into an ordered list of candidate matches.
pub trait MatchingEngine: Send + Sync {
    /// Short engine identifier used in logs.
    fn name(&self) -> &'static str;

    /// Processes the document at `path`. An empty list is a valid result.
    fn process_document(&self, path: &Path) -> Result<Vec<Match>, MatchingError>;
}
