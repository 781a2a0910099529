// src/export/mod.rs - Serialization sinks for the final collection
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::models::{Lead, LeadCollection, RunSummary};

mod csv;
mod excel;
mod json;

pub use csv::write_csv;
pub use excel::write_excel;
pub use json::write_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Excel,
    Csv,
    Json,
    All,
}

/// Fixed columns every sheet starts with; `extra` keys follow, sorted.
pub(crate) const FIXED_COLUMNS: &[&str] = &["name", "email", "phone", "address", "website", "source"];

/// Distinct extra keys observed across one sheet's leads, in sorted order.
pub(crate) fn extra_columns(leads: &[Lead]) -> Vec<String> {
    let mut keys: Vec<String> = leads
        .iter()
        .flat_map(|lead| lead.extra.keys().cloned())
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

pub(crate) fn cell_value(lead: &Lead, column: &str) -> String {
    match column {
        "name" => lead.name.clone(),
        "email" => lead.contact.email.clone().unwrap_or_default(),
        "phone" => lead.contact.phone.clone().unwrap_or_default(),
        "address" => lead.address.clone().unwrap_or_default(),
        "website" => lead.website.clone().unwrap_or_default(),
        "source" => lead.source_label(),
        extra_key => lead.extra.get(extra_key).cloned().unwrap_or_default(),
    }
}

/// Write every requested format. Individual failures are reported and the
/// remaining formats are still attempted; the run only fails when nothing
/// could be written at all.
pub async fn export(
    collection: &LeadCollection,
    summary: &RunSummary,
    format: ExportFormat,
    output: &Path,
    pretty_json: bool,
) -> Result<Vec<PathBuf>> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let mut plan: Vec<(ExportFormat, PathBuf)> = Vec::new();
    if matches!(format, ExportFormat::Excel | ExportFormat::All) {
        plan.push((ExportFormat::Excel, output.to_path_buf()));
    }
    if matches!(format, ExportFormat::Csv | ExportFormat::All) {
        plan.push((ExportFormat::Csv, output.with_extension("csv")));
    }
    if matches!(format, ExportFormat::Json | ExportFormat::All) {
        plan.push((ExportFormat::Json, output.with_extension("json")));
    }

    let mut written = Vec::new();
    let mut failures = Vec::new();

    for (fmt, path) in plan {
        let result = match fmt {
            ExportFormat::Excel => write_excel(collection, &path),
            ExportFormat::Csv => write_csv(&collection.all, &path),
            ExportFormat::Json => write_json(collection, summary, &path, pretty_json).await,
            ExportFormat::All => unreachable!("All is expanded above"),
        };
        match result {
            Ok(()) => {
                info!("Exported {} leads to {}", collection.all.len(), path.display());
                written.push(path);
            }
            Err(e) => {
                error!("Export failed for {}: {}", path.display(), e);
                failures.push(e);
            }
        }
    }

    if written.is_empty() {
        let detail = failures
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::export(&output.display().to_string(), detail));
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contact, LeadKind, SourceBatch, SourceOutcome, SourceReport};

    pub(crate) fn sample_lead(name: &str, source: &str, extra: &[(&str, &str)]) -> Lead {
        Lead {
            kind: LeadKind::Business,
            name: name.to_string(),
            contact: Contact {
                email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
                phone: Some("+1-512-555-0100".to_string()),
            },
            address: Some("100 Congress Ave, Austin".to_string()),
            website: None,
            sources: vec![source.to_string()],
            extra: extra
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub(crate) fn sample_collection() -> LeadCollection {
        let leads = vec![
            sample_lead("Blue Bonnet", "yelp", &[("Rating", "4.5")]),
            sample_lead("Dough Co", "google_maps", &[("Hours", "7-5")]),
        ];
        LeadCollection {
            by_source: vec![
                SourceBatch {
                    source_id: "google_maps".into(),
                    leads: vec![leads[1].clone()],
                },
                SourceBatch {
                    source_id: "yelp".into(),
                    leads: vec![leads[0].clone()],
                },
            ],
            all: leads,
        }
    }

    pub(crate) fn sample_summary() -> RunSummary {
        RunSummary {
            industry: "bakery".into(),
            location: "Austin".into(),
            kind: LeadKind::Business,
            sources: vec![SourceReport {
                source_id: "yelp".into(),
                outcome: SourceOutcome::Collected(2),
            }],
            total_collected: 2,
            total_after_dedup: 2,
            elapsed_ms: 12,
        }
    }

    #[test]
    fn extra_columns_are_sorted_and_distinct() {
        let leads = vec![
            sample_lead("A", "yelp", &[("Rating", "4.5"), ("Hours", "7-5")]),
            sample_lead("B", "yelp", &[("Rating", "4.0")]),
        ];
        assert_eq!(extra_columns(&leads), vec!["Hours", "Rating"]);
        assert!(extra_columns(&[]).is_empty());
    }

    #[test]
    fn cell_value_covers_fixed_and_extra_columns() {
        let lead = sample_lead("Blue Bonnet", "yelp", &[("Rating", "4.5")]);
        assert_eq!(cell_value(&lead, "name"), "Blue Bonnet");
        assert_eq!(cell_value(&lead, "source"), "yelp");
        assert_eq!(cell_value(&lead, "Rating"), "4.5");
        assert_eq!(cell_value(&lead, "website"), "");
        assert_eq!(cell_value(&lead, "Unknown"), "");
    }

    #[tokio::test]
    async fn all_formats_survive_a_single_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the xlsx path makes the Excel write fail
        let xlsx_path = dir.path().join("leads.xlsx");
        std::fs::create_dir(&xlsx_path).unwrap();

        let collection = sample_collection();
        let summary = sample_summary();
        let written = export(&collection, &summary, ExportFormat::All, &xlsx_path, true)
            .await
            .unwrap();

        assert_eq!(written.len(), 2);
        assert!(dir.path().join("leads.csv").exists());
        assert!(dir.path().join("leads.json").exists());
    }

    #[tokio::test]
    async fn total_export_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let xlsx_path = dir.path().join("leads.xlsx");
        std::fs::create_dir(&xlsx_path).unwrap();

        let collection = sample_collection();
        let summary = sample_summary();
        let err = export(&collection, &summary, ExportFormat::Excel, &xlsx_path, true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Export { .. }));
    }
}
