//! JSON-document backend storing the whole catalog in a single file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;

use crate::identity::LocationId;
use crate::location::{ImportSummary, LocationGroup, LocationRecord};
use crate::merge::{index_records, merge_locations};
use crate::query::{group_by_country, locations_in_city};
use crate::store::LocationStore;

/// Errors raised by the JSON-document backend.
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    /// The catalog file exists but could not be read.
    #[error("failed to read catalog file {path:?}")]
    Read {
        /// Catalog file that failed to read.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// The catalog file is not a valid JSON array of locations.
    #[error("failed to parse catalog file {path:?}")]
    Parse {
        /// Catalog file holding the malformed content.
        path: PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
    /// The in-memory catalog could not be serialised.
    #[error("failed to serialise catalog")]
    Serialise {
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
    /// The serialised catalog could not be written back.
    #[error("failed to write catalog file {path:?}")]
    Write {
        /// Catalog file that failed to write.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
}

/// Catalog persisted as one pretty-printed JSON array.
///
/// [`DocumentStore::load`] reads the whole file into memory; every merge
/// rewrites it. An absent file is an empty catalog, so a first import and a
/// later re-import go through the same path.
#[derive(Debug)]
pub struct DocumentStore {
    path: PathBuf,
    records: IndexMap<LocationId, LocationRecord>,
}

impl DocumentStore {
    /// Load the catalog at `path`, treating a missing file as empty.
    ///
    /// # Errors
    /// Returns [`DocumentStoreError::Read`] when the file exists but cannot
    /// be read, and [`DocumentStoreError::Parse`] when its content is not a
    /// JSON array of locations. Corruption is surfaced rather than silently
    /// starting over.
    pub fn load<P>(path: P) -> Result<Self, DocumentStoreError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let records = match fs::read_to_string(path) {
            Ok(content) => {
                let parsed: Vec<LocationRecord> =
                    serde_json::from_str(&content).map_err(|source| DocumentStoreError::Parse {
                        path: path.to_path_buf(),
                        source,
                    })?;
                index_records(parsed)
            }
            Err(source) if source.kind() == io::ErrorKind::NotFound => IndexMap::new(),
            Err(source) => {
                return Err(DocumentStoreError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    /// Write the catalog back to its file as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns [`DocumentStoreError::Serialise`] or
    /// [`DocumentStoreError::Write`] when encoding or writing fails.
    pub fn save(&self) -> Result<(), DocumentStoreError> {
        let records: Vec<&LocationRecord> = self.records.values().collect();
        let content = serde_json::to_string_pretty(&records)
            .map_err(|source| DocumentStoreError::Serialise { source })?;
        fs::write(&self.path, content).map_err(|source| DocumentStoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog holds no locations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the stored locations in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &LocationRecord> {
        self.records.values()
    }
}

impl LocationStore for DocumentStore {
    type Error = DocumentStoreError;

    /// Merge the batch and rewrite the backing file.
    ///
    /// The file is rewritten even when every record was skipped, keeping its
    /// formatting canonical.
    fn add_locations(
        &mut self,
        locations: Vec<LocationRecord>,
    ) -> Result<ImportSummary, Self::Error> {
        let summary = merge_locations(&mut self.records, locations);
        self.save()?;
        Ok(summary)
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

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn scratch() -> TempDir {
        TempDir::new().expect("temporary directory should be created")
    }

    #[rstest]
    fn missing_file_loads_as_empty(scratch: TempDir) {
        let store = DocumentStore::load(scratch.path().join("catalog.json"))
            .expect("absent catalog should load");
        assert!(store.is_empty());
    }

    #[rstest]
    fn corrupt_file_is_reported(scratch: TempDir) {
        let path = scratch.path().join("catalog.json");
        fs::write(&path, "{ not json").expect("fixture file should be written");

        let error = DocumentStore::load(&path).expect_err("corrupt catalog should fail to load");
        assert!(matches!(error, DocumentStoreError::Parse { .. }));
    }

    #[rstest]
    fn unreadable_path_is_reported(scratch: TempDir) {
        // The scratch directory itself is not a file.
        let error = DocumentStore::load(scratch.path())
            .expect_err("reading a directory as a catalog should fail");
        assert!(matches!(error, DocumentStoreError::Read { .. }));
    }

    #[rstest]
    fn save_writes_a_json_array(scratch: TempDir) {
        let path = scratch.path().join("catalog.json");
        let mut store = DocumentStore::load(&path).expect("absent catalog should load");
        store
            .add_locations(vec![LocationRecord::new(
                "Sushi Place",
                "Great sushi",
                "http://maps.google.com/1",
                vec!["Red".into()],
                "Tokyo",
                "Japan",
            )])
            .expect("merge into empty catalog should succeed");

        let content = fs::read_to_string(&path).expect("catalog file should exist");
        assert!(content.trim_start().starts_with('['));
        assert!(content.contains("\"sourceUrl\""));
        assert!(content.contains("\"lastUpdated\""));
    }
}
