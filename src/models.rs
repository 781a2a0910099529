// src/models.rs
use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// What kind of lead a run is collecting. Fixed at query time; every lead in
/// one run carries the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LeadKind {
    Business,
    Personal,
    Institutional,
}

impl std::fmt::Display for LeadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadKind::Business => write!(f, "business"),
            LeadKind::Personal => write!(f, "personal"),
            LeadKind::Institutional => write!(f, "institutional"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none()
    }
}

/// One raw field mapping as returned by a source adapter, before
/// normalization.
pub type RawRecord = BTreeMap<String, String>;

/// Canonical lead record. `name` is always non-empty and `sources` always
/// holds at least the originating adapter id; merged leads accumulate every
/// contributing adapter in `sources`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub kind: LeadKind,
    pub name: String,
    #[serde(default)]
    pub contact: Contact,
    pub address: Option<String>,
    pub website: Option<String>,
    pub sources: Vec<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl Lead {
    /// Provenance column value for flat exports.
    pub fn source_label(&self) -> String {
        self.sources.join("; ")
    }

    pub fn add_source(&mut self, source_id: &str) {
        if !self.sources.iter().any(|s| s == source_id) {
            self.sources.push(source_id.to_string());
        }
    }
}

/// One adapter's normalized contribution, kept pre-dedup for the per-source
/// export sheets.
#[derive(Debug, Clone, Serialize)]
pub struct SourceBatch {
    pub source_id: String,
    pub leads: Vec<Lead>,
}

/// Final output of a run: per-source batches (grouped by adapter identity,
/// independent of completion order) plus the flattened deduplicated
/// sequence. Immutable once the pipeline returns it.
#[derive(Debug, Serialize)]
pub struct LeadCollection {
    pub by_source: Vec<SourceBatch>,
    pub all: Vec<Lead>,
}

impl LeadCollection {
    pub fn batch(&self, source_id: &str) -> Option<&SourceBatch> {
        self.by_source.iter().find(|b| b.source_id == source_id)
    }
}

/// Outcome of one adapter within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Adapter completed; count of normalized leads it contributed.
    Collected(usize),
    /// Retries exhausted; contribution recorded as empty.
    Failed(String),
    /// Target count was already met before this adapter was invoked.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source_id: String,
    pub outcome: SourceOutcome,
}

/// Per-run summary shown to the user after export.
#[derive(Debug)]
pub struct RunSummary {
    pub industry: String,
    pub location: String,
    pub kind: LeadKind,
    pub sources: Vec<SourceReport>,
    pub total_collected: usize,
    pub total_after_dedup: usize,
    pub elapsed_ms: u64,
}

impl RunSummary {
    pub fn failed_sources(&self) -> Vec<&str> {
        self.sources
            .iter()
            .filter(|r| matches!(r.outcome, SourceOutcome::Failed(_)))
            .map(|r| r.source_id.as_str())
            .collect()
    }
}
