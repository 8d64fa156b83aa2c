//! Error types emitted by the tastepin CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.
//! Domain errors already describe themselves, so most variants are
//! transparent wrappers.

use camino::Utf8PathBuf;
use tastepin_core::{DocumentStoreError, SqliteStoreError};
use tastepin_data::country::CountryMapError;
use tastepin_data::import::ImportError;
use tastepin_data::sync::SyncError;
use thiserror::Error;

/// Errors emitted by the tastepin CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// The city-to-country overrides file could not be loaded.
    #[error(transparent)]
    CountryMap(#[from] CountryMapError),
    /// The directory that should hold the catalog could not be created.
    #[error("failed to create catalog directory for {path}")]
    PrepareCatalog {
        /// Catalog file whose parent directory was being created.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The JSON catalog could not be opened or updated.
    #[error(transparent)]
    DocumentStore(#[from] DocumentStoreError),
    /// The SQLite catalog could not be opened or updated.
    #[error(transparent)]
    SqliteStore(#[from] SqliteStoreError),
    /// The export directory could not be walked.
    #[error(transparent)]
    Import(#[from] ImportError),
    /// Export mirroring failed before any file was considered.
    #[error(transparent)]
    Sync(#[from] SyncError),
}
