//! Record hygiene applied before records leave the harvester: drop records
//! with nothing to read and collapse duplicates of the same article.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::models::MetadataRecord;

/// True when the record carries a non-blank title or abstract.
pub fn has_content(record: &MetadataRecord) -> bool {
    let non_blank = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
    non_blank(&record.title) || non_blank(&record.abstract_text)
}

/// Grouping key: pmid, else doi, else a hash of the whole record.
pub fn dedup_key(record: &MetadataRecord) -> String {
    let present = |value: &Option<String>| value.as_deref().filter(|v| !v.is_empty()).map(str::to_string);
    present(&record.pmid)
        .or_else(|| present(&record.doi))
        .unwrap_or_else(|| {
            let mut hasher = DefaultHasher::new();
            record.hash(&mut hasher);
            format!("hash:{:016x}", hasher.finish())
        })
}

fn richness(record: &MetadataRecord) -> usize {
    let len = |value: &Option<String>| value.as_deref().map_or(0, |v| v.chars().count());
    len(&record.title) + len(&record.abstract_text)
}

/// Collapse records sharing a key, keeping the one with the longest
/// title + abstract. Ties keep the earlier record; output follows the order
/// in which keys were first seen.
pub fn dedupe_records(records: Vec<MetadataRecord>) -> Vec<MetadataRecord> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<MetadataRecord> = Vec::new();

    for record in records {
        let key = dedup_key(&record);
        match slots.get(&key) {
            Some(&idx) => {
                if richness(&record) > richness(&kept[idx]) {
                    kept[idx] = record;
                }
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(record);
            }
        }
    }

    kept
}

/// Drop contentless records, then dedupe.
pub fn tidy(records: Vec<MetadataRecord>) -> Vec<MetadataRecord> {
    let before = records.len();
    let kept = dedupe_records(records.into_iter().filter(has_content).collect());
    tracing::debug!(before, after = kept.len(), "tidied records");
    kept
}
