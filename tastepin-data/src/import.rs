//! Directory-level import driver feeding export files into a store.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use tastepin_core::{ImportSummary, LocationStore};
use thiserror::Error;

use crate::country::CountryMap;
use crate::takeout::{city_from_filename, parse_saved_places};

/// Outcome of importing a single export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileImport {
    /// Export file name within the directory.
    pub file: String,
    /// City derived from the file name.
    pub city: String,
    /// Country the city resolved to.
    pub country: String,
    /// Merge summary reported by the store.
    pub summary: ImportSummary,
}

/// Outcome of importing a whole export directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Per-file outcomes in filename order, successfully merged files only.
    pub files: Vec<FileImport>,
    /// Counts and errors accumulated across the directory.
    pub totals: ImportSummary,
}

/// Errors fatal to a directory import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The export directory could not be listed.
    #[error("failed to list export directory {path}")]
    ListDir {
        /// Directory that failed to list.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
}

/// Import every export file in `exports_dir` into `store`.
///
/// Files are processed in filename order for deterministic output; names
/// that match neither export convention are ignored. A file that fails to
/// read, parse, or persist is recorded as `Error processing <file>:
/// <message>` in the report totals and the import moves on. Only an
/// unlistable directory is fatal.
///
/// # Errors
/// Returns [`ImportError::ListDir`] when `exports_dir` cannot be read.
pub fn import_directory<S>(
    store: &mut S,
    exports_dir: &Utf8Path,
    countries: &CountryMap,
) -> Result<ImportReport, ImportError>
where
    S: LocationStore,
{
    let names =
        tastepin_fs::dir_file_names(exports_dir).map_err(|source| ImportError::ListDir {
            path: exports_dir.to_owned(),
            source,
        })?;

    let mut report = ImportReport::default();
    for name in names {
        let Some(city) = city_from_filename(&name) else {
            continue;
        };
        let country = countries.resolve(&city).to_owned();

        match import_file(store, &exports_dir.join(&name), &city, &country) {
            Ok(summary) => {
                report.totals.absorb(summary.clone());
                report.files.push(FileImport {
                    file: name,
                    city,
                    country,
                    summary,
                });
            }
            Err(error) => {
                log::warn!("import of {name} failed: {error}");
                report
                    .totals
                    .errors
                    .push(format!("Error processing {name}: {error}"));
            }
        }
    }

    Ok(report)
}

fn import_file<S>(
    store: &mut S,
    path: &Utf8Path,
    city: &str,
    country: &str,
) -> Result<ImportSummary, Box<dyn std::error::Error + Send + Sync>>
where
    S: LocationStore,
{
    let content = tastepin_fs::read_utf8_file(path)?;
    let records = parse_saved_places(&content, city, country)?;
    Ok(store.add_locations(records)?)
}
