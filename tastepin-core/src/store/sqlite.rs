//! SQLite backend storing the catalog in normalised relational form.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Error as SqliteError, OptionalExtension};
use thiserror::Error;

use crate::identity::LocationId;
use crate::location::{CityInfo, ImportSummary, LocationGroup, LocationRecord};
use crate::store::LocationStore;

/// Catalog persisted across `countries`, `cities`, `locations`, `tags`, and
/// `location_tags` tables.
///
/// Opening a store initialises the schema, so a fresh database file and an
/// existing one go through the same path. Each import batch runs in a single
/// transaction; a failure rolls the whole batch back and is reported through
/// [`ImportSummary::errors`] rather than as an `Err`.
#[derive(Debug)]
pub struct SqliteStore {
    connection: Connection,
}

impl SqliteStore {
    /// Open (or create) a catalog database at `path`.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::OpenDatabase`] when the file cannot be
    /// opened and [`SqliteStoreError::Migration`] when the schema cannot be
    /// initialised.
    pub fn open<P>(path: P) -> Result<Self, SqliteStoreError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let connection = Connection::open(path).map_err(|source| SqliteStoreError::OpenDatabase {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(connection)
    }

    /// Open a catalog backed by an in-memory database.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::Migration`] when the schema cannot be
    /// initialised.
    ///
    /// # Examples
    /// ```
    /// use tastepin_core::{LocationRecord, LocationStore, SqliteStore};
    ///
    /// let mut store = SqliteStore::open_in_memory().expect("create in-memory store");
    /// let summary = store
    ///     .add_locations(vec![LocationRecord::new(
    ///         "Sushi Place",
    ///         "Great sushi",
    ///         "http://maps.google.com/1",
    ///         vec!["Red".into()],
    ///         "Tokyo",
    ///         "Japan",
    ///     )])
    ///     .expect("persist batch");
    /// assert_eq!(summary.added, 1);
    ///
    /// let groups = store.locations_by_country().expect("group locations");
    /// assert_eq!(groups[0].country, "Japan");
    /// assert_eq!(groups[0].cities[0].location_count, 1);
    /// ```
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let connection = Connection::open_in_memory().map_err(|source| SqliteStoreError::Sqlite {
            operation: "open in-memory database",
            source,
        })?;
        Self::with_connection(connection)
    }

    fn with_connection(mut connection: Connection) -> Result<Self, SqliteStoreError> {
        initialise_schema(&mut connection)?;
        Ok(Self { connection })
    }

    /// Close the underlying connection, surfacing any pending failure.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::Close`] when SQLite refuses to close the
    /// connection.
    pub fn close(self) -> Result<(), SqliteStoreError> {
        self.connection
            .close()
            .map_err(|(_, source)| SqliteStoreError::Close { source })
    }

    fn tags_for(&self, location_id: &str) -> Result<Vec<String>, SqliteStoreError> {
        let mut statement = self
            .connection
            .prepare_cached(
                "SELECT tags.name FROM tags
                 JOIN location_tags ON location_tags.tag_id = tags.id
                 WHERE location_tags.location_id = ?1
                 ORDER BY location_tags.rowid",
            )
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "prepare tag listing",
                source,
            })?;
        statement
            .query_map([location_id], |row| row.get(0))
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "list location tags",
                source,
            })?
            .collect::<Result<Vec<String>, _>>()
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "read tag rows",
                source,
            })
    }
}

impl LocationStore for SqliteStore {
    type Error = SqliteStoreError;

    /// Merge the batch inside one transaction.
    ///
    /// A record whose id is already present counts as updated even when its
    /// content is unchanged; only the JSON-document backend distinguishes
    /// skips. When the transaction fails the batch rolls back and the
    /// summary reports zero counts with the failure in
    /// [`ImportSummary::errors`].
    fn add_locations(
        &mut self,
        locations: Vec<LocationRecord>,
    ) -> Result<ImportSummary, Self::Error> {
        match persist_batch(&mut self.connection, &locations) {
            Ok(summary) => Ok(summary),
            Err(error) => Ok(ImportSummary {
                errors: vec![error_chain(&error)],
                ..ImportSummary::default()
            }),
        }
    }

    fn locations_by_country(&self) -> Result<Vec<LocationGroup>, Self::Error> {
        let mut statement = self
            .connection
            .prepare_cached(
                "SELECT countries.name, cities.name, COUNT(locations.id)
                 FROM countries
                 JOIN cities ON cities.country_id = countries.id
                 LEFT JOIN locations ON locations.city_id = cities.id
                 GROUP BY countries.name, cities.name
                 ORDER BY countries.name, cities.name",
            )
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "prepare country grouping",
                source,
            })?;

        let rows = statement
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "group locations by country",
                source,
            })?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "read country grouping rows",
                source,
            })?;

        let mut groups: Vec<LocationGroup> = Vec::new();
        for (country, city, count) in rows {
            let location_count = usize::try_from(count).unwrap_or_default();
            match groups.last_mut() {
                Some(group) if group.country == country => {
                    group.total_locations += location_count;
                    group.cities.push(CityInfo {
                        name: city,
                        location_count,
                    });
                }
                _ => groups.push(LocationGroup {
                    country,
                    cities: vec![CityInfo {
                        name: city,
                        location_count,
                    }],
                    total_locations: location_count,
                }),
            }
        }
        Ok(groups)
    }

    fn locations_by_city(
        &self,
        country: &str,
        city: &str,
    ) -> Result<Vec<LocationRecord>, Self::Error> {
        let mut statement = self
            .connection
            .prepare_cached(
                "SELECT locations.id, locations.name, locations.description,
                        locations.google_maps_url, locations.updated_at
                 FROM locations
                 JOIN cities ON locations.city_id = cities.id
                 JOIN countries ON cities.country_id = countries.id
                 WHERE countries.name = ?1 AND cities.name = ?2
                 ORDER BY locations.name",
            )
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "prepare city listing",
                source,
            })?;

        let rows = statement
            .query_map((country, city), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "list locations in city",
                source,
            })?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "read city listing rows",
                source,
            })?;

        let mut records = Vec::with_capacity(rows.len());
        for (id, name, description, source_url, stored_at) in rows {
            let last_updated = DateTime::parse_from_rfc3339(&stored_at)
                .map_err(|source| SqliteStoreError::InvalidTimestamp {
                    id: id.clone(),
                    source,
                })?
                .with_timezone(&Utc);
            let tags = self.tags_for(&id)?;
            records.push(LocationRecord {
                id: LocationId::from(id),
                name,
                description,
                source_url,
                tags,
                city: city.to_owned(),
                country: country.to_owned(),
                last_updated,
            });
        }
        Ok(records)
    }
}

fn persist_batch(
    connection: &mut Connection,
    locations: &[LocationRecord],
) -> Result<ImportSummary, SqliteStoreError> {
    let mut summary = ImportSummary::default();
    if locations.is_empty() {
        return Ok(summary);
    }

    let transaction = connection
        .transaction()
        .map_err(|source| SqliteStoreError::Sqlite {
            operation: "begin import transaction",
            source,
        })?;

    {
        let mut insert_country = transaction
            .prepare_cached("INSERT OR IGNORE INTO countries (name) VALUES (?1)")
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "prepare insert country",
                source,
            })?;
        let mut find_country = transaction
            .prepare_cached("SELECT id FROM countries WHERE name = ?1")
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "prepare find country",
                source,
            })?;
        let mut insert_city = transaction
            .prepare_cached("INSERT OR IGNORE INTO cities (name, country_id) VALUES (?1, ?2)")
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "prepare insert city",
                source,
            })?;
        let mut find_city = transaction
            .prepare_cached("SELECT id FROM cities WHERE name = ?1 AND country_id = ?2")
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "prepare find city",
                source,
            })?;
        let mut check_location = transaction
            .prepare_cached("SELECT 1 FROM locations WHERE id = ?1 LIMIT 1")
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "prepare location lookup",
                source,
            })?;
        let mut insert_location = transaction
            .prepare_cached(
                "INSERT INTO locations (
                    id,
                    name,
                    description,
                    google_maps_url,
                    city_id,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "prepare insert location",
                source,
            })?;
        let mut update_location = transaction
            .prepare_cached(
                "UPDATE locations SET
                    name = ?2,
                    description = ?3,
                    google_maps_url = ?4,
                    city_id = ?5,
                    updated_at = ?6
                 WHERE id = ?1",
            )
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "prepare update location",
                source,
            })?;
        let mut clear_tags = transaction
            .prepare_cached("DELETE FROM location_tags WHERE location_id = ?1")
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "prepare clear location tags",
                source,
            })?;
        let mut insert_tag = transaction
            .prepare_cached("INSERT OR IGNORE INTO tags (name) VALUES (?1)")
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "prepare insert tag",
                source,
            })?;
        let mut find_tag = transaction
            .prepare_cached("SELECT id FROM tags WHERE name = ?1")
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "prepare find tag",
                source,
            })?;
        let mut link_tag = transaction
            .prepare_cached(
                "INSERT OR IGNORE INTO location_tags (location_id, tag_id) VALUES (?1, ?2)",
            )
            .map_err(|source| SqliteStoreError::Sqlite {
                operation: "prepare link tag",
                source,
            })?;

        for record in locations {
            insert_country
                .execute([record.country.as_str()])
                .map_err(|source| SqliteStoreError::Sqlite {
                    operation: "insert country",
                    source,
                })?;
            let country_id: i64 = find_country
                .query_row([record.country.as_str()], |row| row.get(0))
                .optional()
                .map_err(|source| SqliteStoreError::Sqlite {
                    operation: "find country",
                    source,
                })?
                .ok_or_else(|| SqliteStoreError::MissingRow {
                    entity: "country",
                    name: record.country.clone(),
                })?;

            insert_city
                .execute((record.city.as_str(), country_id))
                .map_err(|source| SqliteStoreError::Sqlite {
                    operation: "insert city",
                    source,
                })?;
            let city_id: i64 = find_city
                .query_row((record.city.as_str(), country_id), |row| row.get(0))
                .optional()
                .map_err(|source| SqliteStoreError::Sqlite {
                    operation: "find city",
                    source,
                })?
                .ok_or_else(|| SqliteStoreError::MissingRow {
                    entity: "city",
                    name: record.city.clone(),
                })?;

            let exists = check_location
                .query_row([record.id.as_str()], |_| Ok(()))
                .optional()
                .map_err(|source| SqliteStoreError::Sqlite {
                    operation: "check location presence",
                    source,
                })?
                .is_some();

            let timestamp = record.last_updated.to_rfc3339();
            if exists {
                update_location
                    .execute((
                        record.id.as_str(),
                        record.name.as_str(),
                        record.description.as_str(),
                        record.source_url.as_str(),
                        city_id,
                        timestamp.as_str(),
                    ))
                    .map_err(|source| SqliteStoreError::Sqlite {
                        operation: "update location",
                        source,
                    })?;
                summary.updated += 1;
            } else {
                insert_location
                    .execute((
                        record.id.as_str(),
                        record.name.as_str(),
                        record.description.as_str(),
                        record.source_url.as_str(),
                        city_id,
                        timestamp.as_str(),
                    ))
                    .map_err(|source| SqliteStoreError::Sqlite {
                        operation: "insert location",
                        source,
                    })?;
                summary.added += 1;
            }

            clear_tags
                .execute([record.id.as_str()])
                .map_err(|source| SqliteStoreError::Sqlite {
                    operation: "clear location tags",
                    source,
                })?;
            for tag in &record.tags {
                insert_tag
                    .execute([tag.as_str()])
                    .map_err(|source| SqliteStoreError::Sqlite {
                        operation: "insert tag",
                        source,
                    })?;
                let tag_id: i64 = find_tag
                    .query_row([tag.as_str()], |row| row.get(0))
                    .optional()
                    .map_err(|source| SqliteStoreError::Sqlite {
                        operation: "find tag",
                        source,
                    })?
                    .ok_or_else(|| SqliteStoreError::MissingRow {
                        entity: "tag",
                        name: tag.clone(),
                    })?;
                link_tag
                    .execute((record.id.as_str(), tag_id))
                    .map_err(|source| SqliteStoreError::Sqlite {
                        operation: "link tag",
                        source,
                    })?;
            }
        }
    }

    transaction
        .commit()
        .map_err(|source| SqliteStoreError::Sqlite {
            operation: "commit import transaction",
            source,
        })?;

    Ok(summary)
}

fn initialise_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| SqliteStoreError::Sqlite {
            operation: "enable foreign keys",
            source,
        })?;

    let transaction = connection
        .transaction()
        .map_err(|source| SqliteStoreError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    create_core_tables(&transaction)?;
    create_indexes(&transaction)?;

    transaction
        .commit()
        .map_err(|source| SqliteStoreError::Migration {
            step: "commit schema transaction",
            source,
        })?;

    Ok(())
}

fn create_core_tables(transaction: &rusqlite::Transaction<'_>) -> Result<(), SqliteStoreError> {
    run_migration_step(
        transaction,
        "create countries",
        "CREATE TABLE IF NOT EXISTS countries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )",
    )?;
    run_migration_step(
        transaction,
        "create cities",
        "CREATE TABLE IF NOT EXISTS cities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            country_id INTEGER NOT NULL,
            FOREIGN KEY (country_id) REFERENCES countries(id),
            UNIQUE (name, country_id)
        )",
    )?;
    run_migration_step(
        transaction,
        "create locations",
        "CREATE TABLE IF NOT EXISTS locations (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            google_maps_url TEXT NOT NULL,
            city_id INTEGER NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (city_id) REFERENCES cities(id)
        )",
    )?;
    run_migration_step(
        transaction,
        "create tags",
        "CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )",
    )?;
    run_migration_step(
        transaction,
        "create location_tags",
        "CREATE TABLE IF NOT EXISTS location_tags (
            location_id TEXT NOT NULL,
            tag_id INTEGER NOT NULL,
            FOREIGN KEY (location_id) REFERENCES locations(id),
            FOREIGN KEY (tag_id) REFERENCES tags(id),
            UNIQUE (location_id, tag_id)
        )",
    )
}

fn create_indexes(transaction: &rusqlite::Transaction<'_>) -> Result<(), SqliteStoreError> {
    run_migration_step(
        transaction,
        "index locations by city",
        "CREATE INDEX IF NOT EXISTS idx_locations_city ON locations(city_id)",
    )
}

fn run_migration_step(
    transaction: &rusqlite::Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), SqliteStoreError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SqliteStoreError::Migration { step, source })
}

/// Render an error with its source chain for the import summary.
fn error_chain(error: &SqliteStoreError) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Errors raised by the SQLite backend.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Opening the database file failed.
    #[error("failed to open SQLite database at {path:?}")]
    OpenDatabase {
        /// Location of the database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A schema initialisation step failed.
    #[error("failed to execute migration step '{step}'")]
    Migration {
        /// Name of the failed step.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A statement failed outside schema initialisation.
    #[error("failed to {operation}")]
    Sqlite {
        /// Operation being performed.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// An upsert could not find the row it just inserted.
    #[error("failed to create or find {entity}: {name}")]
    MissingRow {
        /// Table the row belongs to.
        entity: &'static str,
        /// Name the row was keyed by.
        name: String,
    },
    /// A stored `updated_at` value failed to parse.
    #[error("stored timestamp for location {id} is not RFC 3339")]
    InvalidTimestamp {
        /// Identifier of the location with the bad timestamp.
        id: String,
        /// Timestamp decoding failure.
        #[source]
        source: chrono::ParseError,
    },
    /// Closing the connection failed.
    #[error("failed to close SQLite connection")]
    Close {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}
