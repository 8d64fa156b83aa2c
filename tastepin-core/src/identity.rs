//! Content-addressed identity for location records.

use std::fmt;

/// Identifier derived from a location's name and source URL.
///
/// Two records describing the same real-world place (same name, same maps
/// link) always collide to the same id, no matter which export file they came
/// from or what their tags and notes say. The id is the lowercase hex BLAKE3
/// digest produced by [`location_id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LocationId(String);

impl LocationId {
    /// View the id as its hex string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LocationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Derive the identity for a location from its name and source URL.
///
/// The digest covers the UTF-8 concatenation `name + "-" + source_url`, so it
/// is stable across runs and platforms and independent of every other field.
/// The merge engine relies on this to tell "same place, changed content" from
/// "different place".
///
/// # Examples
/// ```
/// use tastepin_core::location_id;
///
/// let first = location_id("Sushi Place", "http://maps.google.com/1");
/// let again = location_id("Sushi Place", "http://maps.google.com/1");
/// assert_eq!(first, again);
///
/// let other = location_id("Sushi Place", "http://maps.google.com/2");
/// assert_ne!(first, other);
/// ```
pub fn location_id(name: &str, source_url: &str) -> LocationId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(name.as_bytes());
    hasher.update(b"-");
    hasher.update(source_url.as_bytes());
    LocationId(hasher.finalize().to_hex().to_string())
}
