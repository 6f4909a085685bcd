//! CSV report writing and reading
//!
//! The report has no header row. Each row is
//! `name, business, address, phone, count`.

use crate::output::aggregate::AggregatedCompany;
use crate::HarvestError;
use std::io::{Read, Write};
use std::path::Path;

/// One row read back from a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub name: String,
    pub business: String,
    pub address: String,
    pub phone: String,
    pub count: u32,
}

impl ReportRow {
    fn to_record(&self) -> [String; 5] {
        [
            self.name.clone(),
            self.business.clone(),
            self.address.clone(),
            self.phone.clone(),
            self.count.to_string(),
        ]
    }
}

/// Writes the report to `path`, replacing any existing file
///
/// # Returns
///
/// * `Ok(())` - Report written and flushed
/// * `Err(HarvestError::Export)` - The file could not be created or written
pub fn write_report(path: &Path, companies: &[AggregatedCompany]) -> Result<(), HarvestError> {
    let export_error = |source: csv::Error| HarvestError::Export {
        path: path.display().to_string(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(export_error)?;

    for company in companies {
        writer.write_record(company.to_row()).map_err(export_error)?;
    }

    writer.flush().map_err(|e| export_error(e.into()))?;
    Ok(())
}

/// Writes report rows to any writer
pub fn write_rows<W: Write>(writer: W, rows: &[ReportRow]) -> Result<(), HarvestError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    for row in rows {
        writer.write_record(row.to_record())?;
    }

    writer.flush()?;
    Ok(())
}

/// Reads report rows from any reader
///
/// Rows with a missing or unparsable count are read with a count of 1.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<ReportRow>, HarvestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();

        let count = match record.get(4).map(str::trim).map(str::parse::<u32>) {
            Some(Ok(count)) => count,
            _ => {
                tracing::warn!("Row for '{}' has no valid count, using 1", field(0));
                1
            }
        };

        rows.push(ReportRow {
            name: field(0),
            business: field(1),
            address: field(2),
            phone: field(3),
            count,
        });
    }

    Ok(rows)
}
