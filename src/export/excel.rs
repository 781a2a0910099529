// src/export/excel.rs
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::{Error, Result};
use crate::models::{Lead, LeadCollection};

use super::{cell_value, extra_columns, FIXED_COLUMNS};

// Excel refuses sheet names longer than 31 characters
const MAX_SHEET_NAME: usize = 31;

fn sheet_name(source_id: &str) -> String {
    source_id.chars().take(MAX_SHEET_NAME).collect()
}

fn write_sheet(sheet: &mut Worksheet, leads: &[Lead], header: &Format) -> Result<()> {
    let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(extra_columns(leads));

    let to_export_err = |e: rust_xlsxwriter::XlsxError| Error::export("worksheet", e);

    for (col, column) in columns.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, column, header)
            .map_err(to_export_err)?;
    }

    for (row, lead) in leads.iter().enumerate() {
        for (col, column) in columns.iter().enumerate() {
            let value = cell_value(lead, column);
            if !value.is_empty() {
                sheet
                    .write_string((row + 1) as u32, col as u16, &value)
                    .map_err(to_export_err)?;
            }
        }
    }

    Ok(())
}

/// One "All Leads" sheet with the deduplicated collection, then one sheet per
/// adapter with its raw (pre-dedup) contribution. Each sheet discovers its
/// own extra-key columns.
pub fn write_excel(collection: &LeadCollection, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let path_err = |e: rust_xlsxwriter::XlsxError| Error::export(&path.display().to_string(), e);

    let sheet = workbook.add_worksheet();
    sheet.set_name("All Leads").map_err(path_err)?;
    write_sheet(sheet, &collection.all, &header)?;

    for batch in &collection.by_source {
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name(&batch.source_id)).map_err(path_err)?;
        write_sheet(sheet, &batch.leads, &header)?;
    }

    workbook.save(path).map_err(path_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample_collection;
    use super::*;

    #[test]
    fn sheet_names_are_clamped_to_excel_limit() {
        assert_eq!(sheet_name("yelp"), "yelp");
        let long = "a_source_with_an_extremely_long_identifier";
        assert_eq!(sheet_name(long).len(), 31);
    }

    #[test]
    fn workbook_is_written_with_all_leads_and_per_source_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.xlsx");

        write_excel(&sample_collection(), &path).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.is_file());
        assert!(metadata.len() > 0);
    }

    #[test]
    fn write_to_unwritable_path_is_an_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("leads.xlsx");
        let err = write_excel(&sample_collection(), &path).unwrap_err();
        assert!(matches!(err, Error::Export { .. }));
    }
}
