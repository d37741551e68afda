//! Demo matching engine.
//!
//! Scans the document's text for keywords of a small built-in catalog.
//! Binary formats such as PDF are read as lossy UTF-8, which is enough to
//! find keywords in uncompressed text streams. When nothing matches, the
//! fixed demo result is returned so the workflow can still be walked
//! through end to end.

use domain::models::Match;
use domain::services::{MatchingEngine, MatchingError};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

const BASE_CONFIDENCE: f64 = 0.6;
const CONFIDENCE_STEP: f64 = 0.05;
const MAX_CONFIDENCE: f64 = 0.97;
const FALLBACK_CONFIDENCE: f64 = 0.75;

struct CatalogEntry {
    keyword: &'static str,
    pattern: Regex,
    sku: &'static str,
    name: &'static str,
    category: &'static str,
}

impl CatalogEntry {
    fn new(
        keyword: &'static str,
        pattern: &str,
        sku: &'static str,
        name: &'static str,
        category: &'static str,
    ) -> Self {
        Self {
            keyword,
            pattern: Regex::new(pattern).unwrap(),
            sku,
            name,
            category,
        }
    }
}

lazy_static! {
    static ref CATALOG: Vec<CatalogEntry> = vec![
        CatalogEntry::new("pump", r"(?i)\bpumps?\b", "P-101", "Centrifugal Pump", "Pumps"),
        CatalogEntry::new("valve", r"(?i)\bvalves?\b", "V-305", "Control Valve", "Valves"),
        CatalogEntry::new("flange", r"(?i)\bflanges?\b", "F-220", "Weld Neck Flange", "Piping"),
        CatalogEntry::new("pipe", r"(?i)\bpip(e|es|ing)\b", "S-120", "Seamless Steel Pipe", "Piping"),
        CatalogEntry::new("gasket", r"(?i)\bgaskets?\b", "G-410", "Spiral Wound Gasket", "Seals"),
        CatalogEntry::new("motor", r"(?i)\bmotors?\b", "M-550", "Induction Motor", "Drives"),
    ];
}

/// Keyword-based matching engine used in demo deployments.
#[derive(Debug, Default, Clone)]
pub struct DemoMatchingEngine;

impl DemoMatchingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Matches found in `text`, in catalog order.
    pub fn match_text(&self, text: &str) -> Vec<Match> {
        CATALOG
            .iter()
            .filter_map(|entry| {
                let hits = entry.pattern.find_iter(text).count();
                if hits == 0 {
                    return None;
                }
                Some(
                    Match::new(entry.sku, entry.name)
                        .with_confidence(confidence_for(hits))
                        .with_reason(format!(
                            "Keyword '{}' found {} time(s)",
                            entry.keyword, hits
                        ))
                        .with_category(entry.category),
                )
            })
            .collect()
    }

    /// The fixed result returned when no keyword is found.
    pub fn fallback_matches() -> Vec<Match> {
        vec![
            Match::new("P-101", "Centrifugal Pump")
                .with_confidence(0.92)
                .with_reason("Demo result")
                .with_category("Pumps"),
            Match::new("V-305", "Control Valve")
                .with_confidence(FALLBACK_CONFIDENCE)
                .with_reason("Demo result")
                .with_category("Valves"),
        ]
    }
}

fn confidence_for(hits: usize) -> f64 {
    let extra = hits.saturating_sub(1) as f64 * CONFIDENCE_STEP;
    (BASE_CONFIDENCE + extra).min(MAX_CONFIDENCE)
}

impl MatchingEngine for DemoMatchingEngine {
    fn name(&self) -> &'static str {
        "demo"
    }

    fn process_document(&self, path: &Path) -> Result<Vec<Match>, MatchingError> {
        let bytes = std::fs::read(path).map_err(|source| MatchingError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let matches = self.match_text(&String::from_utf8_lossy(&bytes));
        if matches.is_empty() {
            return Ok(Self::fallback_matches());
        }
        Ok(matches)
    }
}
