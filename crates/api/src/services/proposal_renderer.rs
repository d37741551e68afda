//! File-backed proposal renderer.
//!
//! Proposals are rendered as plain text into the configured output
//! directory. The artifact reference handed back to callers is the bare
//! file name, which the download route resolves against the same
//! directory. Every render gets a fresh name, so an artifact a stored
//! task points at is never rewritten.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use domain::services::{ProposalDocument, ProposalRenderer, RenderError};
use shared::validation::validate_download_filename;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const RULE_WIDTH: usize = 40;

/// Writes proposal artifacts to a local directory.
#[derive(Debug, Clone)]
pub struct FileProposalRenderer {
    output_dir: PathBuf,
}

impl FileProposalRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Artifact file name for a task at the generation instant.
    ///
    /// `attempt` disambiguates renders that share a timestamp.
    pub fn artifact_name(task_id: &str, generated_at: &DateTime<Utc>, attempt: u32) -> String {
        let stamp = generated_at.format("%Y%m%d_%H%M%S%9f");
        match attempt {
            0 => format!("Proposal_{}_{}.txt", task_id, stamp),
            n => format!("Proposal_{}_{}_{}.txt", task_id, stamp, n),
        }
    }

    /// First artifact name for the document that is not taken yet.
    ///
    /// Renders of one task are serialized by the caller, so the name stays
    /// free until it is written.
    async fn unused_name(
        &self,
        document: &ProposalDocument<'_>,
    ) -> Result<(String, PathBuf), RenderError> {
        let mut attempt = 0;
        loop {
            let name = Self::artifact_name(&document.task.id, &document.generated_at, attempt);
            let path = self.resolve(&name)?;
            let taken = tokio::fs::try_exists(&path)
                .await
                .map_err(|source| RenderError::Io {
                    path: path.clone(),
                    source,
                })?;
            if !taken {
                return Ok((name, path));
            }
            attempt += 1;
        }
    }

    fn resolve(&self, artifact_ref: &str) -> Result<PathBuf, RenderError> {
        validate_download_filename(artifact_ref)
            .map_err(|_| RenderError::InvalidReference(artifact_ref.to_string()))?;
        Ok(self.output_dir.join(artifact_ref))
    }
}

/// Formats the plain-text proposal body.
///
/// The margin is printed with a decimal point (`20.0%`).
pub fn render_text(document: &ProposalDocument<'_>) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut lines = vec![
        format!("PROPOSAL FOR TENDER {}", document.task.source_filename),
        format!(
            "Generated At: {}",
            document
                .generated_at
                .to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        format!("Task ID: {}", document.task.id),
        rule.clone(),
    ];
    for item in document.items {
        lines.push(format!("Item: {} - {}", item.sku, item.description));
        lines.push(format!("Price: ${:.2}", item.sell_price));
    }
    lines.push(rule);
    lines.push(format!("Total Value: ${:.2}", document.total_value));
    lines.push(format!("Margin: {:?}%", document.margin_percent));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Writes `contents` next to `path` under a hidden temporary name and
/// renames it into place, removing the temporary file on failure.
async fn write_atomically(path: &Path, file_name: &str, contents: &[u8]) -> Result<(), RenderError> {
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    let result = async {
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(source) = result {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temporary artifact");
            }
        }
        return Err(RenderError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

#[async_trait]
impl ProposalRenderer for FileProposalRenderer {
    async fn render(&self, document: &ProposalDocument<'_>) -> Result<String, RenderError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| RenderError::Io {
                path: self.output_dir.clone(),
                source,
            })?;

        let (name, path) = self.unused_name(document).await?;
        let body = render_text(document);

        write_atomically(&path, &name, body.as_bytes()).await?;

        debug!(artifact = %name, bytes = body.len(), "Proposal artifact written");
        Ok(name)
    }

    async fn open(&self, artifact_ref: &str) -> Result<Option<Vec<u8>>, RenderError> {
        let path = self.resolve(artifact_ref)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(RenderError::Io { path, source }),
        }
    }
}
