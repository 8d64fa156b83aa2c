//! Persistence backends for the location catalog.
//!
//! The [`LocationStore`] trait defines the contract every backend honours:
//! merge a batch of [`LocationRecord`] values and answer the two catalog
//! queries. The JSON-document and SQLite backends behind the `serde` and
//! `store-sqlite` features both implement it, and equivalent data yields
//! equivalent query results regardless of backend.

use crate::location::{ImportSummary, LocationGroup, LocationRecord};

#[cfg(feature = "serde")]
mod document;
#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "serde")]
pub use document::{DocumentStore, DocumentStoreError};
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteStore, SqliteStoreError};

/// A persistent collection of locations with merge-on-import semantics.
///
/// Implementers classify each incoming record as added, updated, or skipped
/// against what they already hold, and report per-record failures in the
/// summary rather than aborting the batch.
///
/// # Examples
///
/// ```rust
/// use std::convert::Infallible;
///
/// use indexmap::IndexMap;
/// use tastepin_core::{
///     ImportSummary, LocationGroup, LocationId, LocationRecord, LocationStore,
///     group_by_country, locations_in_city, merge_locations,
/// };
///
/// #[derive(Default)]
/// struct MemoryStore {
///     records: IndexMap<LocationId, LocationRecord>,
/// }
///
/// impl LocationStore for MemoryStore {
///     type Error = Infallible;
///
///     fn add_locations(
///         &mut self,
///         locations: Vec<LocationRecord>,
///     ) -> Result<ImportSummary, Self::Error> {
///         Ok(merge_locations(&mut self.records, locations))
///     }
///
///     fn locations_by_country(&self) -> Result<Vec<LocationGroup>, Self::Error> {
///         Ok(group_by_country(self.records.values()))
///     }
///
///     fn locations_by_city(
///         &self,
///         country: &str,
///         city: &str,
///     ) -> Result<Vec<LocationRecord>, Self::Error> {
///         Ok(locations_in_city(self.records.values(), country, city))
///     }
/// }
///
/// let mut store = MemoryStore::default();
/// let record = LocationRecord::new(
///     "Sushi Place",
///     "Great sushi",
///     "http://maps.google.com/1",
///     vec!["Red".into()],
///     "Tokyo",
///     "Japan",
/// );
///
/// let summary = store.add_locations(vec![record]).expect("memory store cannot fail");
/// assert_eq!(summary.added, 1);
///
/// let groups = store.locations_by_country().expect("memory store cannot fail");
/// assert_eq!(groups[0].country, "Japan");
/// assert_eq!(groups[0].total_locations, 1);
/// ```
pub trait LocationStore {
    /// Failure type surfaced by the backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Merge a batch of locations into the store.
    ///
    /// Returns a summary of how each record was classified. Per-record
    /// problems belong in [`ImportSummary::errors`]; an `Err` means the
    /// store itself is unusable.
    fn add_locations(
        &mut self,
        locations: Vec<LocationRecord>,
    ) -> Result<ImportSummary, Self::Error>;

    /// Group the stored locations by country and count them per city.
    ///
    /// Countries, and cities within them, are ordered lexicographically by
    /// name.
    fn locations_by_country(&self) -> Result<Vec<LocationGroup>, Self::Error>;

    /// List the locations of one city ordered by location name.
    ///
    /// Matching is exact and case-sensitive; the same city name under a
    /// different country yields nothing.
    fn locations_by_city(
        &self,
        country: &str,
        city: &str,
    ) -> Result<Vec<LocationRecord>, Self::Error>;
}
