use crate::domain::SaleRecord;
use crate::store::SaleStore;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{error, info};

pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UploadSummary {
    pub records: usize,
    /// Records in chunks the store accepted.
    pub records_ok: usize,
    pub chunks_ok: usize,
    pub chunks_failed: usize,
}

impl UploadSummary {
    pub fn all_failed(&self) -> bool {
        self.chunks_failed > 0 && self.chunks_ok == 0
    }
}

/// Collapses records that share a full (address, sold_date) key. The last
/// one wins but keeps the first one's position. Undated records pass through.
pub fn dedupe_by_key(records: Vec<SaleRecord>) -> Vec<SaleRecord> {
    let mut slots: HashMap<(String, NaiveDate), usize> = HashMap::new();
    let mut out: Vec<SaleRecord> = Vec::with_capacity(records.len());

    for record in records {
        let key = record.natural_key().map(|(a, d)| (a.to_string(), d));
        match key {
            Some(key) => match slots.get(&key) {
                Some(&idx) => out[idx] = record,
                None => {
                    slots.insert(key, out.len());
                    out.push(record);
                }
            },
            None => out.push(record),
        }
    }

    out
}

/// Writes `records` in chunks of `batch_size`. A chunk that fails is logged
/// and skipped; the remaining chunks still go out.
pub fn upload<S: SaleStore + ?Sized>(
    store: &S,
    records: Vec<SaleRecord>,
    batch_size: usize,
    locality: &str,
) -> UploadSummary {
    let records = dedupe_by_key(records);
    let mut summary = UploadSummary {
        records: records.len(),
        ..UploadSummary::default()
    };

    for (i, chunk) in records.chunks(batch_size.max(1)).enumerate() {
        let n = i + 1;
        if let Some(first) = chunk.first() {
            info!("Uploading batch {n} ({} records), first: {}", chunk.len(), first.address);
        }

        match store.upsert(chunk) {
            Ok(()) => {
                summary.chunks_ok += 1;
                summary.records_ok += chunk.len();
                info!("Successfully uploaded batch {n}");
            }
            Err(e) => {
                summary.chunks_failed += 1;
                error!("Error uploading batch {n} for {locality}: {e}");
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures::{record, RecordingStore};

    #[test]
    fn splits_into_fixed_size_chunks() {
        let store = RecordingStore::default();
        let records: Vec<_> = (0..250).map(|i| record(&format!("{i} Long St"), Some(i))).collect();

        let summary = upload(&store, records, 100, "BONDI");

        assert_eq!(store.chunk_sizes(), vec![100, 100, 50]);
        assert_eq!(summary, UploadSummary { records: 250, records_ok: 250, chunks_ok: 3, chunks_failed: 0 });
    }

    #[test]
    fn failed_chunk_does_not_stop_the_rest() {
        let store = RecordingStore::failing_on(&[1]);
        let records: Vec<_> = (0..30).map(|i| record(&format!("{i} Short St"), Some(i))).collect();

        let summary = upload(&store, records, 10, "BONDI");

        assert_eq!(store.chunk_sizes(), vec![10, 10, 10]);
        assert_eq!(summary.chunks_ok, 2);
        assert_eq!(summary.records_ok, 20);
        assert_eq!(summary.chunks_failed, 1);
        assert!(!summary.all_failed());
    }

    #[test]
    fn every_chunk_failing_is_reported() {
        let store = RecordingStore::failing_on(&[0]);
        let summary = upload(&store, vec![record("1 A St", Some(1))], 100, "BONDI");
        assert!(summary.all_failed());
    }

    #[test]
    fn duplicate_keys_collapse_to_last_seen() {
        let mut later = record("1 A St", Some(5));
        later.price = Some(999.0);

        let out = dedupe_by_key(vec![
            record("1 A St", Some(5)),
            record("2 B St", Some(5)),
            later,
            record("3 C St", None),
            record("3 C St", None),
        ]);

        let addresses: Vec<_> = out.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(addresses, vec!["1 A St", "2 B St", "3 C St", "3 C St"]);
        assert_eq!(out[0].price, Some(999.0));
    }

    #[test]
    fn nothing_to_upload_sends_nothing() {
        let store = RecordingStore::default();
        let summary = upload(&store, Vec::new(), 100, "BONDI");
        assert_eq!(summary, UploadSummary::default());
        assert!(store.chunk_sizes().is_empty());
    }
}
