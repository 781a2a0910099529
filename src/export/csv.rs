// src/export/csv.rs
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::models::Lead;

use super::{cell_value, extra_columns, FIXED_COLUMNS};

/// RFC 4180 quoting: wrap when the value contains a comma, quote or newline.
fn escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Flat CSV of the deduplicated collection: fixed columns first, then one
/// column per distinct extra key.
pub fn write_csv(leads: &[Lead], path: &Path) -> Result<()> {
    let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(extra_columns(leads));

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{}", columns.iter().map(|c| escape(c)).collect::<Vec<_>>().join(","))?;

    for lead in leads {
        let row: Vec<String> = columns
            .iter()
            .map(|column| escape(&cell_value(lead, column)))
            .collect();
        writeln!(file, "{}", row.join(","))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample_lead;
    use super::*;

    #[test]
    fn escape_quotes_only_when_needed() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn csv_has_header_plus_one_row_per_lead() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.csv");
        let leads = vec![
            sample_lead("Blue Bonnet", "yelp", &[("Rating", "4.5")]),
            sample_lead("Dough, Co", "google_maps", &[]),
        ];

        write_csv(&leads, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "name,email,phone,address,website,source,Rating");
        assert!(lines[1].starts_with("Blue Bonnet,"));
        assert!(lines[1].ends_with(",4.5"));
        // Comma inside a name gets quoted
        assert!(lines[2].starts_with("\"Dough, Co\","));
    }
}
