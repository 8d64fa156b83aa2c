//! In-memory query helpers shared by the stores.
//!
//! Both backends answer the same two questions: how many locations live in
//! each city, grouped by country, and which locations belong to one named
//! city. The SQL backend answers with `GROUP BY` and `ORDER BY`; these
//! helpers produce the same shapes, in the same byte-wise ordering, for
//! collections held in memory.

use std::collections::BTreeMap;

use crate::location::{CityInfo, LocationGroup, LocationRecord};

/// Group locations by country and count them per city.
///
/// Countries and their cities are ordered lexicographically by name, and
/// each group carries a running total across its cities.
///
/// # Examples
/// ```
/// use tastepin_core::{LocationRecord, group_by_country};
///
/// let records = vec![
///     LocationRecord::new("A", "", "http://maps/1", vec![], "Tokyo", "Japan"),
///     LocationRecord::new("B", "", "http://maps/2", vec![], "Osaka", "Japan"),
///     LocationRecord::new("C", "", "http://maps/3", vec![], "Tokyo", "Japan"),
/// ];
///
/// let groups = group_by_country(&records);
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].country, "Japan");
/// assert_eq!(groups[0].total_locations, 3);
/// assert_eq!(groups[0].cities[0].name, "Osaka");
/// ```
pub fn group_by_country<'a, I>(records: I) -> Vec<LocationGroup>
where
    I: IntoIterator<Item = &'a LocationRecord>,
{
    let mut counts: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for record in records {
        *counts
            .entry(record.country.as_str())
            .or_default()
            .entry(record.city.as_str())
            .or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(country, cities)| {
            let cities: Vec<CityInfo> = cities
                .into_iter()
                .map(|(name, location_count)| CityInfo {
                    name: name.to_owned(),
                    location_count,
                })
                .collect();
            let total_locations = cities.iter().map(|city| city.location_count).sum();
            LocationGroup {
                country: country.to_owned(),
                cities,
                total_locations,
            }
        })
        .collect()
}

/// List every location in `city`, `country`, ordered by location name.
///
/// Matching is exact and case-sensitive. A city name that appears in two
/// countries only yields the locations of the requested one.
pub fn locations_in_city<'a, I>(records: I, country: &str, city: &str) -> Vec<LocationRecord>
where
    I: IntoIterator<Item = &'a LocationRecord>,
{
    let mut matches: Vec<LocationRecord> = records
        .into_iter()
        .filter(|record| record.country == country && record.city == city)
        .cloned()
        .collect();
    matches.sort_by(|a, b| a.name.cmp(&b.name));
    matches
}
