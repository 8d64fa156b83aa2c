//! Reconciliation of incoming records against a stored collection.

use chrono::Utc;
use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::identity::LocationId;
use crate::location::{ImportSummary, LocationRecord};

/// Index a flat record list by id, preserving first-seen order.
///
/// Should the input somehow contain duplicate ids, the last record wins,
/// matching the merge engine's treatment of repeated rows.
pub fn index_records(records: Vec<LocationRecord>) -> IndexMap<LocationId, LocationRecord> {
    records
        .into_iter()
        .map(|record| (record.id.clone(), record))
        .collect()
}

/// Merge `incoming` into `existing`, classifying every record.
///
/// Unknown ids are inserted as-is. For a known id the stored record is
/// replaced only when the content fields differ (see
/// [`LocationRecord::content_matches`]), with `last_updated` refreshed to the
/// merge time; identical content leaves the stored record untouched,
/// timestamp included. City and country follow the incoming record on
/// update, so a re-import can correct a previously unresolved country.
///
/// Merging the same id-deduplicated batch twice reports every record as
/// skipped the second time.
///
/// # Examples
/// ```
/// use indexmap::IndexMap;
/// use tastepin_core::{LocationRecord, merge_locations};
///
/// let mut catalog = IndexMap::new();
/// let record = LocationRecord::new(
///     "Sushi Place",
///     "Great sushi",
///     "http://maps.google.com/1",
///     vec!["Red".into()],
///     "Tokyo",
///     "Japan",
/// );
///
/// let first = merge_locations(&mut catalog, vec![record.clone()]);
/// assert_eq!((first.added, first.updated, first.skipped), (1, 0, 0));
///
/// let second = merge_locations(&mut catalog, vec![record]);
/// assert_eq!((second.added, second.updated, second.skipped), (0, 0, 1));
/// ```
pub fn merge_locations(
    existing: &mut IndexMap<LocationId, LocationRecord>,
    incoming: Vec<LocationRecord>,
) -> ImportSummary {
    let mut summary = ImportSummary::default();
    for record in incoming {
        match existing.entry(record.id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                summary.added += 1;
            }
            Entry::Occupied(mut slot) => {
                if slot.get().content_matches(&record) {
                    summary.skipped += 1;
                } else {
                    slot.insert(LocationRecord {
                        last_updated: Utc::now(),
                        ..record
                    });
                    summary.updated += 1;
                }
            }
        }
    }
    summary
}
