//! City to country resolution for import drivers.

use std::collections::HashMap;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Country recorded when a city is absent from the mapping table.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Errors raised while loading a country map from disk.
#[derive(Debug, Error)]
pub enum CountryMapError {
    /// The mapping file could not be read.
    #[error("failed to read country map {path}")]
    Read {
        /// Mapping file that failed to read.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// The mapping file is not a JSON object of city to country names.
    #[error("failed to parse country map {path}")]
    Parse {
        /// Mapping file holding the malformed content.
        path: Utf8PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Lookup table from city name to country name.
///
/// Matching is exact and case-sensitive, the same as the catalog queries.
/// Cities missing from the table resolve to [`UNKNOWN_COUNTRY`]; a later
/// re-import with a corrected table moves their locations to the right
/// country.
#[derive(Debug, Clone)]
pub struct CountryMap {
    entries: HashMap<String, String>,
}

impl CountryMap {
    /// The table of cities with known exports.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = [
            // Asia
            ("Tokyo", "Japan"),
            ("Osaka", "Japan"),
            ("Kyoto", "Japan"),
            ("Hiroshima", "Japan"),
            ("Kanazawa", "Japan"),
            ("Nara", "Japan"),
            ("Uji", "Japan"),
            ("Ise", "Japan"),
            ("Hong Kong", "Hong Kong"),
            ("BKK", "Thailand"),
            ("Hanoi", "Vietnam"),
            ("Saigon", "Vietnam"),
            ("KL", "Malaysia"),
            ("Ipoh", "Malaysia"),
            // Europe
            ("London", "United Kingdom"),
            ("Barcelona", "Spain"),
            ("Madrid", "Spain"),
            ("San Sebastian", "Spain"),
            ("Bilbao", "Spain"),
            ("Valencia", "Spain"),
            ("Seville", "Spain"),
            ("Cordoba", "Spain"),
            ("Berlin", "Germany"),
            ("Munich", "Germany"),
            ("Nuremberg", "Germany"),
            ("Florence", "Italy"),
            ("Milan", "Italy"),
            ("Spezia + Cinque Terre", "Italy"),
            ("Split", "Croatia"),
            ("Dubrovnik", "Croatia"),
            ("Zagreb", "Croatia"),
            ("Zadar", "Croatia"),
            ("Mali Ston", "Croatia"),
            // Australia
            ("Melbourne", "Australia"),
            ("Perth", "Australia"),
            ("Ballarat", "Australia"),
            ("Great Ocean Route", "Australia"),
            // Routes
            ("Romantic Road", "Germany"),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(city, country)| (city.to_owned(), country.to_owned()))
                .collect(),
        }
    }

    /// Load a JSON object of city to country names layered over the
    /// built-in table.
    ///
    /// Entries from the file take precedence, so a map can both add cities
    /// and correct built-in ones.
    ///
    /// # Errors
    /// Returns [`CountryMapError::Read`] or [`CountryMapError::Parse`] when
    /// the file cannot be read or is not a JSON object of strings.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, CountryMapError> {
        let content =
            tastepin_fs::read_utf8_file(path).map_err(|source| CountryMapError::Read {
                path: path.to_owned(),
                source,
            })?;
        let overrides: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|source| CountryMapError::Parse {
                path: path.to_owned(),
                source,
            })?;

        let mut map = Self::builtin();
        map.entries.extend(overrides);
        Ok(map)
    }

    /// Resolve a city to its country, falling back to [`UNKNOWN_COUNTRY`].
    ///
    /// # Examples
    /// ```
    /// use tastepin_data::country::CountryMap;
    ///
    /// let map = CountryMap::builtin();
    /// assert_eq!(map.resolve("Tokyo"), "Japan");
    /// assert_eq!(map.resolve("Atlantis"), "Unknown");
    /// ```
    #[must_use]
    pub fn resolve(&self, city: &str) -> &str {
        self.entries
            .get(city)
            .map_or(UNKNOWN_COUNTRY, String::as_str)
    }

    /// Add or replace a single city entry.
    pub fn insert(&mut self, city: impl Into<String>, country: impl Into<String>) {
        self.entries.insert(city.into(), country.into());
    }
}

impl Default for CountryMap {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn scratch() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 temp path");
        (dir, path)
    }

    #[rstest]
    #[case("Tokyo", "Japan")]
    #[case("Hong Kong", "Hong Kong")]
    #[case("San Sebastian", "Spain")]
    #[case("Great Ocean Route", "Australia")]
    #[case("Romantic Road", "Germany")]
    fn builtin_covers_known_cities(#[case] city: &str, #[case] country: &str) {
        assert_eq!(CountryMap::builtin().resolve(city), country);
    }

    #[rstest]
    fn unknown_cities_fall_back_to_the_sentinel() {
        assert_eq!(CountryMap::builtin().resolve("Atlantis"), UNKNOWN_COUNTRY);
    }

    #[rstest]
    fn file_entries_extend_and_override_the_builtin_table(
        #[from(scratch)] (_dir, root): (TempDir, Utf8PathBuf),
    ) {
        let path = root.join("countries.json");
        std::fs::write(&path, r#"{"Lyon": "France", "Tokyo": "Nippon"}"#)
            .expect("write country map");

        let map = CountryMap::from_json_file(&path).expect("map should load");
        assert_eq!(map.resolve("Lyon"), "France");
        assert_eq!(map.resolve("Tokyo"), "Nippon");
        assert_eq!(map.resolve("Osaka"), "Japan");
    }

    #[rstest]
    fn malformed_file_is_reported(#[from(scratch)] (_dir, root): (TempDir, Utf8PathBuf)) {
        let path = root.join("countries.json");
        std::fs::write(&path, "not json").expect("write country map");

        let error = CountryMap::from_json_file(&path).expect_err("map should fail to parse");
        assert!(matches!(error, CountryMapError::Parse { .. }));
    }

    #[rstest]
    fn missing_file_is_reported(#[from(scratch)] (_dir, root): (TempDir, Utf8PathBuf)) {
        let error = CountryMap::from_json_file(&root.join("absent.json"))
            .expect_err("map should fail to read");
        assert!(matches!(error, CountryMapError::Read { .. }));
    }

    #[rstest]
    fn inserted_entries_take_effect() {
        let mut map = CountryMap::default();
        map.insert("Lyon", "France");
        assert_eq!(map.resolve("Lyon"), "France");
    }
}
