//! Parsing of saved-places exports into location records.
//!
//! Export files are CSV with a `Title,Note,URL,Tags,Comment` header row,
//! one file per city. Some export tools prepend preamble lines before the
//! header; the parser scans for the header and ignores everything above it.

use csv::{ReaderBuilder, Trim};
use tastepin_core::LocationRecord;
use thiserror::Error;

/// Start of the header row that marks the beginning of the export table.
pub const EXPORT_HEADER_PREFIX: &str = "Title,Note,URL";

/// Errors raised while parsing a saved-places export.
#[derive(Debug, Error)]
pub enum SavedPlacesError {
    /// The content carries no recognisable header row.
    #[error("no 'Title,Note,URL' header row found in export content")]
    MissingHeader,
    /// The header row could not be read as CSV.
    #[error("failed to read export header row")]
    Header {
        /// Underlying CSV failure.
        #[source]
        source: csv::Error,
    },
    /// A data row could not be read as CSV.
    #[error("failed to read export data row")]
    Row {
        /// Underlying CSV failure.
        #[source]
        source: csv::Error,
    },
}

/// Parse export `content` into location records for `city` in `country`.
///
/// Columns are looked up by name, so trailing columns may appear in any
/// order; the unused `Comment` column is accepted and ignored. Rows without
/// a non-empty `Title` and `URL` are dropped silently, matching the blank
/// separator rows the export tool emits.
///
/// # Errors
/// Returns [`SavedPlacesError::MissingHeader`] when no header row is found;
/// the rest of a batch import is unaffected by one malformed file.
///
/// # Examples
/// ```
/// use tastepin_data::takeout::parse_saved_places;
///
/// let content = "Title,Note,URL,Tags,Comment\n\
///                Sushi Place,Great sushi,http://maps.google.com/1,Red,\n";
/// let records = parse_saved_places(content, "Tokyo", "Japan").expect("content has a header");
///
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].name, "Sushi Place");
/// assert_eq!(records[0].description, "Great sushi");
/// assert_eq!(records[0].tags, ["Red"]);
/// assert_eq!(records[0].city, "Tokyo");
/// assert_eq!(records[0].country, "Japan");
/// ```
pub fn parse_saved_places(
    content: &str,
    city: &str,
    country: &str,
) -> Result<Vec<LocationRecord>, SavedPlacesError> {
    let table = table_content(content).ok_or(SavedPlacesError::MissingHeader)?;

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(table.as_bytes());

    let headers = reader
        .headers()
        .map_err(|source| SavedPlacesError::Header { source })?
        .clone();
    let column = |name: &str| headers.iter().position(|header| header == name);
    let title_column = column("Title");
    let note_column = column("Note");
    let url_column = column("URL");
    let tags_column = column("Tags");

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|source| SavedPlacesError::Row { source })?;
        let field = |column: Option<usize>| {
            column.and_then(|index| row.get(index)).unwrap_or_default()
        };

        let name = field(title_column);
        let source_url = field(url_column);
        if name.is_empty() || source_url.is_empty() {
            log::debug!("skipping export row without a title or URL");
            continue;
        }

        records.push(LocationRecord::new(
            name,
            field(note_column),
            source_url,
            split_tags(field(tags_column)),
            city,
            country,
        ));
    }

    Ok(records)
}

/// Derive the city name from an export file name.
///
/// Two conventions are recognised: `<City>-food.csv`, where dashes stand in
/// for spaces, and `<City> (Food).csv`. Anything else yields `None`.
///
/// # Examples
/// ```
/// use tastepin_data::takeout::city_from_filename;
///
/// assert_eq!(city_from_filename("Hong-Kong-food.csv"), Some("Hong Kong".into()));
/// assert_eq!(city_from_filename("Tokyo (Food).csv"), Some("Tokyo".into()));
/// assert_eq!(city_from_filename("notes.txt"), None);
/// ```
#[must_use]
pub fn city_from_filename(file_name: &str) -> Option<String> {
    let city = if let Some(stem) = file_name.strip_suffix("-food.csv") {
        stem.replace('-', " ")
    } else if let Some(stem) = file_name.strip_suffix("(Food).csv") {
        stem.to_owned()
    } else {
        return None;
    };

    let city = city.trim();
    if city.is_empty() {
        None
    } else {
        Some(city.to_owned())
    }
}

/// Whether a file name follows one of the export naming conventions.
#[must_use]
pub fn is_export_filename(file_name: &str) -> bool {
    city_from_filename(file_name).is_some()
}

fn table_content(content: &str) -> Option<&str> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.starts_with(EXPORT_HEADER_PREFIX) {
            return content.get(offset..);
        }
        offset += line.len();
    }
    None
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
