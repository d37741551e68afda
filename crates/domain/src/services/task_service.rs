//! Task lifecycle orchestration.
//!
//! The task service is the only component that mutates tasks. It drives
//! ingest → match → validate → price → render, serializes writers per task
//! and appends exactly one audit entry for every successful mutation.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::models::{AuditEntry, NewAuditEntry, Proposal, Task};
use crate::services::matching::MatchingEngine;
use crate::services::pricing;
use crate::services::rendering::{ProposalDocument, ProposalRenderer, RenderError};
use crate::services::store::{AuditLog, StoreError, TaskStore};
use crate::services::task_locks::TaskLocks;

/// Task service errors.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Invalid match index {index} for task with {len} matches")]
    InvalidIndex { index: i64, len: usize },

    #[error("Ingest failed: {0}")]
    IngestFailure(String),

    #[error("Margin {margin_percent}% prices items out of numeric range")]
    PricingOverflow { margin_percent: f64 },

    #[error("Render failed: {0}")]
    RenderFailure(#[from] RenderError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Orchestrates the task lifecycle over injected collaborators.
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    audit_log: Arc<dyn AuditLog>,
    matcher: Arc<dyn MatchingEngine>,
    renderer: Arc<dyn ProposalRenderer>,
    locks: TaskLocks,
    upload_dir: PathBuf,
}

impl TaskService {
    pub fn new(
        store: Arc<dyn TaskStore>,
        audit_log: Arc<dyn AuditLog>,
        matcher: Arc<dyn MatchingEngine>,
        renderer: Arc<dyn ProposalRenderer>,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            audit_log,
            matcher,
            renderer,
            locks: TaskLocks::new(),
            upload_dir: upload_dir.into(),
        }
    }

    /// Directory where ingested documents are stored.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Stores the document, runs the matching engine and persists the
    /// resulting task. Nothing is persisted when matching fails.
    pub async fn ingest(
        &self,
        source_filename: &str,
        contents: &[u8],
    ) -> Result<Task, TaskServiceError> {
        let task_id = Task::generate_id();
        let stored_path = self
            .upload_dir
            .join(format!("{}_{}", task_id, source_filename));

        self.store_document(&stored_path, contents).await?;

        let matches = match self.run_matcher(stored_path.clone()).await {
            Ok(matches) => matches,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&stored_path).await {
                    warn!(
                        path = %stored_path.display(),
                        error = %cleanup,
                        "Failed to remove document after ingest failure"
                    );
                }
                return Err(e);
            }
        };

        let task = Task::matched(task_id, source_filename, matches);
        let digest = shared::crypto::short_digest(contents);

        self.store
            .put_with_audit(
                &task,
                NewAuditEntry::upload(&task.id, source_filename, &digest),
            )
            .await?;

        info!(
            task_id = %task.id,
            filename = %source_filename,
            match_count = task.matches.len(),
            engine = self.matcher.name(),
            "Tender ingested"
        );

        Ok(task)
    }

    pub async fn get(&self, task_id: &str) -> Result<Task, TaskServiceError> {
        self.store
            .get(task_id)
            .await?
            .ok_or_else(|| TaskServiceError::NotFound(task_id.to_string()))
    }

    pub async fn list(&self) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.store.list().await?)
    }

    /// Marks one match as validated.
    ///
    /// `approved` is recorded in the logs only: the match is marked
    /// validated whether or not it is set.
    pub async fn validate(
        &self,
        task_id: &str,
        match_index: i64,
        approved: bool,
        notes: Option<String>,
    ) -> Result<Task, TaskServiceError> {
        let _guard = self.locks.lock(task_id).await;
        let mut task = self.get(task_id).await?;

        let len = task.matches.len();
        let Some(target) = task.match_mut(match_index) else {
            warn!(task_id = %task_id, match_index, len, "Rejected out-of-range match index");
            return Err(TaskServiceError::InvalidIndex {
                index: match_index,
                len,
            });
        };
        target.mark_validated(notes);
        debug!(task_id = %task_id, match_index, approved, "Match marked validated");

        // match_mut succeeded, so the index is a valid usize
        let index = match_index as usize;
        self.store
            .put_with_audit(&task, NewAuditEntry::validate(task_id, index))
            .await?;

        info!(task_id = %task_id, match_index, "Match validated");
        Ok(task)
    }

    /// Prices all matches, renders the artifact and attaches the proposal.
    ///
    /// Repeating the call overwrites the previous proposal. When rendering
    /// fails the stored task is left untouched.
    pub async fn generate_proposal(
        &self,
        task_id: &str,
        margin_percent: f64,
    ) -> Result<Proposal, TaskServiceError> {
        let _guard = self.locks.lock(task_id).await;
        let mut task = self.get(task_id).await?;

        let priced = pricing::price(&task.matches, margin_percent);
        if !priced.is_finite() {
            warn!(task_id = %task_id, margin_percent, "Rejected margin with non-finite prices");
            return Err(TaskServiceError::PricingOverflow { margin_percent });
        }
        let generated_at = Utc::now();

        let artifact_ref = self
            .renderer
            .render(&ProposalDocument {
                task: &task,
                items: &priced.items,
                total_value: priced.total_value,
                margin_percent,
                generated_at,
            })
            .await
            .map_err(|e| {
                error!(task_id = %task_id, error = %e, "Proposal rendering failed");
                e
            })?;

        let proposal = Proposal {
            generated_at,
            margin_percent,
            items: priced.items,
            total_value: priced.total_value,
            artifact_ref,
        };
        task.apply_proposal(proposal.clone());

        self.store
            .put_with_audit(
                &task,
                NewAuditEntry::proposal(task_id, proposal.total_value),
            )
            .await?;

        info!(
            task_id = %task_id,
            margin_percent,
            item_count = proposal.items.len(),
            total_value = proposal.total_value,
            artifact = %proposal.artifact_ref,
            "Proposal generated"
        );

        Ok(proposal)
    }

    /// Audit entries of an existing task in write order.
    pub async fn audit_trail(
        &self,
        task_id: &str,
        after_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<AuditEntry>, TaskServiceError> {
        if self.store.get(task_id).await?.is_none() {
            return Err(TaskServiceError::NotFound(task_id.to_string()));
        }
        Ok(self
            .audit_log
            .list_for_task(task_id, after_id, limit)
            .await?)
    }

    /// Loads a rendered proposal artifact by reference.
    pub async fn open_artifact(
        &self,
        artifact_ref: &str,
    ) -> Result<Option<Vec<u8>>, TaskServiceError> {
        Ok(self.renderer.open(artifact_ref).await?)
    }

    async fn store_document(&self, path: &Path, contents: &[u8]) -> Result<(), TaskServiceError> {
        let write = async {
            tokio::fs::create_dir_all(&self.upload_dir).await?;
            tokio::fs::write(path, contents).await
        };

        write.await.map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to store uploaded document");
            TaskServiceError::IngestFailure(format!("could not store document: {}", e))
        })
    }

    async fn run_matcher(
        &self,
        path: PathBuf,
    ) -> Result<Vec<crate::models::Match>, TaskServiceError> {
        let matcher = self.matcher.clone();
        let outcome = tokio::task::spawn_blocking(move || matcher.process_document(&path))
            .await
            .map_err(|e| TaskServiceError::IngestFailure(format!("matching task aborted: {}", e)))?;

        outcome.map_err(|e| {
            error!(error = %e, engine = self.matcher.name(), "Matching engine failed");
            TaskServiceError::IngestFailure(e.to_string())
        })
    }
}
