//! Canonical record and summary types for the location catalog.

use chrono::{DateTime, Utc};

use crate::identity::{LocationId, location_id};

/// A saved food location in canonical form.
///
/// Every input row is converted into this shape before merge and storage.
/// `city` and `country` come from the import context rather than the row, and
/// the id is derived from `name` and `source_url` alone.
///
/// # Examples
/// ```
/// use tastepin_core::{LocationRecord, location_id};
///
/// let record = LocationRecord::new(
///     "Sushi Place",
///     "Great sushi",
///     "http://maps.google.com/1",
///     vec!["Red".into()],
///     "Tokyo",
///     "Japan",
/// );
///
/// assert_eq!(record.id, location_id("Sushi Place", "http://maps.google.com/1"));
/// assert_eq!(record.country, "Japan");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct LocationRecord {
    /// Content-addressed identifier; never reassigned once minted.
    pub id: LocationId,
    /// Display name of the place.
    pub name: String,
    /// Free-text note carried from the export; may be empty.
    pub description: String,
    /// Canonical maps link; part of the record's identity.
    pub source_url: String,
    /// Display labels in their original order.
    pub tags: Vec<String>,
    /// City the export file was grouped under.
    pub city: String,
    /// Resolved country, or the `"Unknown"` sentinel when unresolved.
    pub country: String,
    /// Refreshed when the record is created and on any content change.
    pub last_updated: DateTime<Utc>,
}

impl LocationRecord {
    /// Build a record, deriving its id and stamping `last_updated` with the
    /// current time.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        source_url: impl Into<String>,
        tags: Vec<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let source_url = source_url.into();
        Self {
            id: location_id(&name, &source_url),
            name,
            description: description.into(),
            source_url,
            tags,
            city: city.into(),
            country: country.into(),
            last_updated: Utc::now(),
        }
    }

    /// True when the content fields compared during a merge match `other`.
    ///
    /// Covers `name`, `description`, `source_url`, and the tag sequence in
    /// order. `city`, `country`, and `last_updated` are deliberately left
    /// out: place names follow the incoming record on update, and timestamps
    /// never participate in change detection.
    pub fn content_matches(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.source_url == other.source_url
            && self.tags == other.tags
    }
}

/// Tally of one merge or import pass.
///
/// `errors` carries recovered per-record and per-file failure messages; a
/// non-empty list never invalidates the counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records inserted for the first time.
    pub added: usize,
    /// Records whose stored content was replaced.
    pub updated: usize,
    /// Records left untouched because nothing changed.
    pub skipped: usize,
    /// Recovered failure messages, in occurrence order.
    pub errors: Vec<String>,
}

impl ImportSummary {
    /// Fold another summary into this one, accumulating counts and errors.
    pub fn absorb(&mut self, other: Self) {
        self.added += other.added;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.errors.extend(other.errors);
    }
}

/// Per-city record count inside a [`LocationGroup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityInfo {
    /// City name.
    pub name: String,
    /// Number of records in the city.
    pub location_count: usize,
}

/// Records of one country grouped by city.
///
/// Derived fresh from the record set on every query and never persisted, so
/// the catalog stays the single source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationGroup {
    /// Country name, possibly the `"Unknown"` sentinel.
    pub country: String,
    /// Cities in ascending name order.
    pub cities: Vec<CityInfo>,
    /// Sum of the city counts.
    pub total_locations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn sushi_place() -> LocationRecord {
        LocationRecord::new(
            "Sushi Place",
            "Great sushi",
            "http://maps.google.com/1",
            vec!["Red".into()],
            "Tokyo",
            "Japan",
        )
    }

    #[rstest]
    fn id_ignores_place_context(sushi_place: LocationRecord) {
        let moved = LocationRecord::new(
            "Sushi Place",
            "Different note",
            "http://maps.google.com/1",
            vec!["Blue".into()],
            "Osaka",
            "Japan",
        );
        assert_eq!(sushi_place.id, moved.id);
    }

    #[rstest]
    fn content_comparison_ignores_place_and_timestamp(sushi_place: LocationRecord) {
        let mut other = sushi_place.clone();
        other.city = "Osaka".into();
        other.country = "Unknown".into();
        other.last_updated = Utc::now();
        assert!(sushi_place.content_matches(&other));
    }

    #[rstest]
    #[case(|record: &mut LocationRecord| record.description = "Closed down".into())]
    #[case(|record: &mut LocationRecord| record.tags = vec!["Blue".into()])]
    #[case(|record: &mut LocationRecord| record.tags = vec![])]
    fn content_comparison_detects_changes(
        sushi_place: LocationRecord,
        #[case] change: fn(&mut LocationRecord),
    ) {
        let mut other = sushi_place.clone();
        change(&mut other);
        assert!(!sushi_place.content_matches(&other));
    }

    #[rstest]
    fn summary_absorbs_counts_and_errors() {
        let mut totals = ImportSummary {
            added: 1,
            updated: 0,
            skipped: 2,
            errors: vec!["Error processing A: boom".into()],
        };
        totals.absorb(ImportSummary {
            added: 2,
            updated: 1,
            skipped: 0,
            errors: vec!["Error processing B: bang".into()],
        });
        assert_eq!(totals.added, 3);
        assert_eq!(totals.updated, 1);
        assert_eq!(totals.skipped, 2);
        assert_eq!(totals.errors.len(), 2);
    }
}
