//! Command-line interface for the tastepin catalog tooling.
//!
//! Subcommands cover the offline maintenance tasks: `import` feeds
//! saved-places exports into a catalog, `sync` mirrors export directories,
//! and `migrate` copies a JSON catalog into SQLite.
#![forbid(unsafe_code)]

mod error;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use tastepin_core::{DocumentStore, LocationStore, SqliteStore};
use tastepin_data::country::CountryMap;
use tastepin_data::import::{ImportReport, import_directory};
use tastepin_data::sync::sync_exports;

pub use error::CliError;

/// Run the tastepin CLI with the current process arguments.
///
/// Recovered per-file failures are printed in the command output and do not
/// fail the process.
///
/// # Errors
/// Returns [`CliError`] when argument parsing fails or a subcommand cannot
/// complete at all.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Import(args) => run_import(args),
        Command::Sync(args) => run_sync(args),
        Command::Migrate(args) => run_migrate(args),
    }
}

fn run_import(args: ImportArgs) -> Result<(), CliError> {
    let ImportArgs {
        exports,
        catalog,
        backend,
        countries,
    } = args;
    let country_map = load_country_map(countries.as_deref())?;
    prepare_catalog_dir(&catalog)?;
    let report = match backend {
        Backend::Document => {
            let mut store = DocumentStore::load(&catalog)?;
            import_directory(&mut store, &exports, &country_map)?
        }
        Backend::Sqlite => {
            let mut store = SqliteStore::open(&catalog)?;
            import_directory(&mut store, &exports, &country_map)?
        }
    };
    report_import(&report);
    Ok(())
}

fn run_sync(args: SyncArgs) -> Result<(), CliError> {
    let SyncArgs { source, target } = args;
    let report = sync_exports(&source, &target)?;
    println!("Copied {} files, skipped {}", report.copied, report.skipped);
    report_errors(&report.errors);
    Ok(())
}

fn run_migrate(args: MigrateArgs) -> Result<(), CliError> {
    let MigrateArgs { from, to } = args;
    let document = DocumentStore::load(&from)?;
    let records: Vec<_> = document.records().cloned().collect();
    prepare_catalog_dir(&to)?;
    let mut sqlite = SqliteStore::open(&to)?;
    let summary = sqlite.add_locations(records)?;
    println!(
        "Migrated {from} into {to}: {} added, {} updated, {} skipped",
        summary.added, summary.updated, summary.skipped
    );
    report_errors(&summary.errors);
    Ok(())
}

fn load_country_map(path: Option<&Utf8Path>) -> Result<CountryMap, CliError> {
    match path {
        Some(path) => Ok(CountryMap::from_json_file(path)?),
        None => Ok(CountryMap::builtin()),
    }
}

fn prepare_catalog_dir(catalog: &Utf8Path) -> Result<(), CliError> {
    tastepin_fs::ensure_parent_dir(catalog).map_err(|source| CliError::PrepareCatalog {
        path: catalog.to_owned(),
        source,
    })
}

fn report_import(report: &ImportReport) {
    for file in &report.files {
        println!(
            "Processed {} ({}, {}): {} added, {} updated, {} skipped",
            file.file,
            file.city,
            file.country,
            file.summary.added,
            file.summary.updated,
            file.summary.skipped
        );
    }
    let totals = &report.totals;
    println!(
        "Totals: {} added, {} updated, {} skipped",
        totals.added, totals.updated, totals.skipped
    );
    report_errors(&totals.errors);
}

fn report_errors(errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    println!("Errors:");
    for error in errors {
        println!("- {error}");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "tastepin",
    about = "Catalog tooling for saved food locations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import saved-places exports from a directory into a catalog.
    Import(ImportArgs),
    /// Mirror export files from one directory into another.
    Sync(SyncArgs),
    /// Copy a JSON catalog into a SQLite catalog.
    Migrate(MigrateArgs),
}

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Parser)]
struct ImportArgs {
    /// Directory holding the saved-places export files.
    #[arg(long, value_name = "dir")]
    exports: Utf8PathBuf,
    /// Catalog file to create or update.
    #[arg(long, value_name = "path")]
    catalog: Utf8PathBuf,
    /// Storage backend for the catalog.
    #[arg(long, value_enum, default_value = "sqlite")]
    backend: Backend,
    /// JSON file of city-to-country entries layered over the built-ins.
    #[arg(long, value_name = "path")]
    countries: Option<Utf8PathBuf>,
}

/// CLI arguments for the `sync` subcommand.
#[derive(Debug, Parser)]
struct SyncArgs {
    /// Directory to copy export files from.
    #[arg(long, value_name = "dir")]
    source: Utf8PathBuf,
    /// Directory to copy export files into; created when absent.
    #[arg(long, value_name = "dir")]
    target: Utf8PathBuf,
}

/// CLI arguments for the `migrate` subcommand.
#[derive(Debug, Parser)]
struct MigrateArgs {
    /// JSON catalog to read records from.
    #[arg(long, value_name = "path")]
    from: Utf8PathBuf,
    /// SQLite catalog to write records into.
    #[arg(long, value_name = "path")]
    to: Utf8PathBuf,
}

/// Storage backend for the catalog file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Whole-file JSON document.
    Document,
    /// Normalized SQLite database.
    Sqlite,
}
