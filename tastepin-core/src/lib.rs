//! Core domain types and merge logic for the Tastepin food location catalog.
//!
//! Saved-places exports are parsed elsewhere into [`LocationRecord`] values;
//! this crate assigns their content-addressed identity, reconciles them
//! against a stored catalog, and persists the outcome through one of two
//! interchangeable [`LocationStore`] backends: a whole-file JSON document
//! store and a normalized SQLite store. Both serve the same country and city
//! groupings.

#![forbid(unsafe_code)]

mod identity;
mod location;
mod merge;
mod query;
mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use identity::{LocationId, location_id};
pub use location::{CityInfo, ImportSummary, LocationGroup, LocationRecord};
pub use merge::{index_records, merge_locations};
pub use query::{group_by_country, locations_in_city};
pub use store::LocationStore;

#[cfg(feature = "serde")]
pub use store::{DocumentStore, DocumentStoreError};

#[cfg(feature = "store-sqlite")]
pub use store::{SqliteStore, SqliteStoreError};
