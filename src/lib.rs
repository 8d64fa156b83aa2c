//! Facade crate for the Tastepin food location catalog engine.
//!
//! This crate re-exports the core domain types and exposes the optional store
//! implementations behind feature flags.

#![forbid(unsafe_code)]

pub use tastepin_core::{
    CityInfo, ImportSummary, LocationGroup, LocationId, LocationRecord, LocationStore,
    group_by_country, index_records, location_id, locations_in_city, merge_locations,
};

#[cfg(feature = "serde")]
pub use tastepin_core::{DocumentStore, DocumentStoreError};

#[cfg(feature = "store-sqlite")]
pub use tastepin_core::{SqliteStore, SqliteStoreError};
