//! Company aggregation
//!
//! Records are grouped by exact company name. The first record seen for a
//! name becomes the representative; every later record with the same name
//! only increments the count. Groups keep first-seen order, so a report is
//! deterministic for a given store.

use crate::storage::{read_record, CompanyRecord, StorageResult, Store};
use std::collections::HashMap;

/// A company with the number of postings it appeared under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedCompany {
    /// First record seen for this name
    pub representative: CompanyRecord,

    pub occurrence_count: u32,
}

impl AggregatedCompany {
    /// Report columns: name, business, address, phone, count
    pub fn to_row(&self) -> [String; 5] {
        let record = &self.representative;
        [
            record.name.clone(),
            record.business.clone(),
            record.address.clone(),
            record.phone.clone(),
            self.occurrence_count.to_string(),
        ]
    }
}

/// Groups records by name in first-seen order
///
/// Empty names are a group like any other.
pub fn aggregate_records<I>(records: I) -> Vec<AggregatedCompany>
where
    I: IntoIterator<Item = CompanyRecord>,
{
    let mut companies: Vec<AggregatedCompany> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for record in records {
        match index_by_name.get(&record.name) {
            Some(&index) => companies[index].occurrence_count += 1,
            None => {
                index_by_name.insert(record.name.clone(), companies.len());
                companies.push(AggregatedCompany {
                    representative: record,
                    occurrence_count: 1,
                });
            }
        }
    }

    companies
}

/// Loads every record whose key matches `pattern` and aggregates them
pub fn aggregate_store(store: &dyn Store, pattern: &str) -> StorageResult<Vec<AggregatedCompany>> {
    let keys = store.scan_keys_matching(pattern)?;
    tracing::debug!("Aggregating {} records matching {}", keys.len(), pattern);

    let records = keys
        .iter()
        .map(|key| read_record(store, key))
        .collect::<StorageResult<Vec<_>>>()?;

    Ok(aggregate_records(records))
}
