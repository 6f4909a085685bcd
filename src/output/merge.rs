//! Merging of previously exported reports
//!
//! Rows from every input are grouped by name in first-seen order. The first
//! row for a name keeps its fields; counts of later rows are added to it.

use crate::output::csv_report::{read_rows, write_rows, ReportRow};
use crate::HarvestError;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Merges report rows by name
pub fn merge_rows<I>(rows: I) -> Vec<ReportRow>
where
    I: IntoIterator<Item = ReportRow>,
{
    let mut merged: Vec<ReportRow> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for row in rows {
        match index_by_name.get(&row.name) {
            Some(&index) => {
                let existing = &mut merged[index];
                existing.count = existing.count.saturating_add(row.count);
            }
            None => {
                index_by_name.insert(row.name.clone(), merged.len());
                merged.push(row);
            }
        }
    }

    merged
}

/// Reads every input report, merges them and writes the result to `output`
///
/// Inputs are read in the order given. The output may be one of the inputs;
/// all inputs are read before it is written.
///
/// # Returns
///
/// * `Ok(usize)` - Number of rows in the merged report
/// * `Err(HarvestError)` - An input could not be read or the output written
pub fn merge_reports(inputs: &[PathBuf], output: &Path) -> Result<usize, HarvestError> {
    let mut rows = Vec::new();
    for input in inputs {
        let file = File::open(input)?;
        let input_rows = read_rows(file)?;
        tracing::info!("Read {} rows from {}", input_rows.len(), input.display());
        rows.extend(input_rows);
    }

    let merged = merge_rows(rows);

    let file = File::create(output)?;
    write_rows(file, &merged).map_err(|e| match e {
        HarvestError::Csv(source) => HarvestError::Export {
            path: output.display().to_string(),
            source,
        },
        other => other,
    })?;

    tracing::info!(
        "Merged {} reports into {} rows at {}",
        inputs.len(),
        merged.len(),
        output.display()
    );
    Ok(merged.len())
}
