// src/export/json.rs
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::models::{Lead, LeadCollection, LeadKind, RunSummary};

#[derive(Serialize)]
struct ExportDocument<'a> {
    industry: &'a str,
    location: &'a str,
    kind: LeadKind,
    generated_at: String,
    total: usize,
    leads: &'a [Lead],
}

pub async fn write_json(
    collection: &LeadCollection,
    summary: &RunSummary,
    path: &Path,
    pretty: bool,
) -> Result<()> {
    let document = ExportDocument {
        industry: &summary.industry,
        location: &summary.location,
        kind: summary.kind,
        generated_at: chrono::Utc::now().to_rfc3339(),
        total: collection.all.len(),
        leads: &collection.all,
    };

    let json = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    tokio::fs::write(path, json).await?;
    Ok(())
}
