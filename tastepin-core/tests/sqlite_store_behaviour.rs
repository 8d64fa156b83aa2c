//! Behavioural tests for `SqliteStore` covering on-disk persistence and
//! cross-backend equivalence.

use rstest::{fixture, rstest};
use tastepin_core::{DocumentStore, LocationRecord, LocationStore, SqliteStore};
use tempfile::TempDir;

fn record(name: &str, city: &str, country: &str, tags: &[&str]) -> LocationRecord {
    LocationRecord::new(
        name,
        "Worth a detour",
        format!("http://maps.google.com/{name}"),
        tags.iter().map(|tag| (*tag).to_owned()).collect(),
        city,
        country,
    )
}

fn sample_batch() -> Vec<LocationRecord> {
    vec![
        record("Sushi Place", "Tokyo", "Japan", &["Umami", "Cheap"]),
        record("Ramen Bar", "Tokyo", "Japan", &["Cheap"]),
        record("Okonomiyaki Stand", "Osaka", "Japan", &[]),
        record("Tapas Bar", "Barcelona", "Spain", &["Late night"]),
    ]
}

#[fixture]
fn scratch() -> TempDir {
    TempDir::new().expect("temporary directory should be created")
}

#[rstest]
fn catalog_survives_reopen(scratch: TempDir) {
    let path = scratch.path().join("catalog.db");

    let mut store = SqliteStore::open(&path).expect("database should open");
    let summary = store
        .add_locations(sample_batch())
        .expect("batch should persist");
    assert_eq!(summary.added, 4);
    store.close().expect("close should succeed");

    let reopened = SqliteStore::open(&path).expect("database should reopen");
    let groups = reopened
        .locations_by_country()
        .expect("grouping should work");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].country, "Japan");
    assert_eq!(groups[0].total_locations, 3);

    let tokyo = reopened
        .locations_by_city("Japan", "Tokyo")
        .expect("listing should work");
    let names: Vec<&str> = tokyo.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Ramen Bar", "Sushi Place"]);
    assert_eq!(tokyo[1].tags, ["Umami", "Cheap"]);
}

#[rstest]
fn reimport_after_reopen_counts_as_updated(scratch: TempDir) {
    let path = scratch.path().join("catalog.db");

    let mut store = SqliteStore::open(&path).expect("database should open");
    store
        .add_locations(sample_batch())
        .expect("batch should persist");
    store.close().expect("close should succeed");

    let mut reopened = SqliteStore::open(&path).expect("database should reopen");
    let summary = reopened
        .add_locations(sample_batch())
        .expect("batch should persist");
    assert_eq!((summary.added, summary.updated, summary.skipped), (0, 4, 0));
}

#[rstest]
fn backends_answer_queries_identically(scratch: TempDir) {
    let batch = sample_batch();

    let mut document = DocumentStore::load(scratch.path().join("catalog.json"))
        .expect("absent catalog should load");
    document
        .add_locations(batch.clone())
        .expect("document merge should succeed");

    let mut sqlite = SqliteStore::open_in_memory().expect("in-memory store should open");
    sqlite.add_locations(batch).expect("batch should persist");

    let document_groups = document
        .locations_by_country()
        .expect("document grouping should work");
    let sqlite_groups = sqlite
        .locations_by_country()
        .expect("sqlite grouping should work");
    assert_eq!(document_groups, sqlite_groups);

    for (country, city) in [("Japan", "Tokyo"), ("Japan", "Osaka"), ("Spain", "Barcelona")] {
        let from_document = document
            .locations_by_city(country, city)
            .expect("document listing should work");
        let from_sqlite = sqlite
            .locations_by_city(country, city)
            .expect("sqlite listing should work");
        assert_eq!(from_document, from_sqlite, "{country}/{city} diverged");
    }
}

#[rstest]
fn moving_a_location_keeps_the_city_row() {
    let mut store = SqliteStore::open_in_memory().expect("in-memory store should open");
    store
        .add_locations(vec![record("Sushi Place", "Tokyo", "Japan", &[])])
        .expect("first batch should persist");
    store
        .add_locations(vec![record("Sushi Place", "Kyoto", "Japan", &[])])
        .expect("second batch should persist");

    let groups = store.locations_by_country().expect("grouping should work");
    let japan = &groups[0];
    let cities: Vec<(&str, usize)> = japan
        .cities
        .iter()
        .map(|city| (city.name.as_str(), city.location_count))
        .collect();
    // The vacated city keeps its row with a zero count.
    assert_eq!(cities, [("Kyoto", 1), ("Tokyo", 0)]);
    assert_eq!(japan.total_locations, 1);
}
