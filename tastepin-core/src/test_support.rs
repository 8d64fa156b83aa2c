//! Test-only, in-memory `LocationStore` implementation used by unit and
//! behaviour tests.

use std::convert::Infallible;

use indexmap::IndexMap;

use crate::identity::LocationId;
use crate::location::{ImportSummary, LocationGroup, LocationRecord};
use crate::merge::merge_locations;
use crate::query::{group_by_country, locations_in_city};
use crate::store::LocationStore;

/// In-memory `LocationStore` implementation used in tests.
///
/// Merges and queries go through the same helpers as the JSON-document
/// backend, minus the file round-trip, so it cannot fail.
#[derive(Default, Debug)]
pub struct MemoryStore {
    records: IndexMap<LocationId, LocationRecord>,
}

impl MemoryStore {
    /// Create a store from a collection of locations.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = LocationRecord>,
    {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.id.clone(), record))
                .collect(),
        }
    }

    /// Iterate over the stored locations in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &LocationRecord> {
        self.records.values()
    }
}

impl LocationStore for MemoryStore {
    type Error = Infallible;

    fn add_locations(
        &mut self,
        locations: Vec<LocationRecord>,
    ) -> Result<ImportSummary, Self::Error> {
        Ok(merge_locations(&mut self.records, locations))
    }

    fn locations_by_country(&self) -> Result<Vec<LocationGroup>, Self::Error> {
        Ok(group_by_country(self.records.values()))
    }

    fn locations_by_city(
        &self,
        country: &str,
        city: &str,
    ) -> Result<Vec<LocationRecord>, Self::Error> {
        Ok(locations_in_city(self.records.values(), country, city))
    }
}
