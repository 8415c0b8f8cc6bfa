//! Cleaning pass over parse outcomes.

use std::collections::HashMap;

use catalog_common::{AssetRecord, FieldValue, InvalidAsset, ParseOutcome};
use esm_catalog::normalize_version;
use tracing::warn;

/// Split outcomes into valid records and invalid assets, normalizing
/// `version` to an integer on the way.
///
/// A record whose version cannot be normalized becomes invalid.
pub fn clean(outcomes: Vec<ParseOutcome>) -> (Vec<AssetRecord>, Vec<InvalidAsset>) {
    let mut records = Vec::with_capacity(outcomes.len());
    let mut invalid = Vec::new();

    for outcome in outcomes {
        let mut record = match outcome.into_result() {
            Ok(record) => record,
            Err(asset) => {
                warn!(path = %asset.path.display(), reason = %asset.reason, "Invalid asset");
                invalid.push(asset);
                continue;
            }
        };

        let version = match record.get("version") {
            Some(FieldValue::Text(raw)) => Some(normalize_version(raw).ok_or_else(|| raw.clone())),
            _ => None,
        };
        match version {
            Some(Ok(version)) => record.insert("version", version),
            Some(Err(raw)) => {
                let asset = InvalidAsset {
                    path: record.path().unwrap_or_default().into(),
                    reason: format!("unparseable version '{}'", raw),
                };
                warn!(path = %asset.path.display(), reason = %asset.reason, "Invalid asset");
                invalid.push(asset);
                continue;
            }
            None => {}
        }

        records.push(record);
    }

    (records, invalid)
}

/// Fields that differ between files of one dataset version.
const PER_FILE_FIELDS: &[&str] = &["path", "version", "time_range", "temporal_subset"];

/// Dataset identity: the directory attributes, without version or time chunk.
fn dataset_key(record: &AssetRecord) -> Vec<(&str, &FieldValue)> {
    record
        .iter()
        .filter(|(k, _)| !PER_FILE_FIELDS.contains(k))
        .collect()
}

/// Keep only the newest version of each dataset.
///
/// Records without an integer version are always kept. Returns the records
/// that survive and the number dropped.
pub fn pick_latest_version(records: Vec<AssetRecord>) -> (Vec<AssetRecord>, usize) {
    let mut latest: HashMap<Vec<(&str, &FieldValue)>, i64> = HashMap::new();
    for record in &records {
        if let Some(version) = record.get("version").and_then(FieldValue::as_i64) {
            latest
                .entry(dataset_key(record))
                .and_modify(|v| *v = (*v).max(version))
                .or_insert(version);
        }
    }

    let keep: Vec<bool> = records
        .iter()
        .map(|record| match record.get("version").and_then(FieldValue::as_i64) {
            Some(version) => latest.get(&dataset_key(record)) == Some(&version),
            None => true,
        })
        .collect();
    drop(latest);

    let before = records.len();
    let kept: Vec<AssetRecord> = records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
