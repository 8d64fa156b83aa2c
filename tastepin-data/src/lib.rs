//! Ingestion and distribution logic for the tastepin catalog.
//!
//! Responsibilities:
//! - Parse saved-places exports into canonical location records.
//! - Resolve cities to countries during import.
//! - Drive whole-directory imports against any `LocationStore`.
//! - Mirror export directories by content hash.
//!
//! Boundaries:
//! - Merge classification and queries live in `tastepin-core`.
//! - File access goes through the `tastepin-fs` helpers.
//!
//! Invariants:
//! - One failing file never aborts the rest of a batch.
//! - Directory scans process files in name order.
#![forbid(unsafe_code)]

pub mod country;
pub mod import;
pub mod sync;
pub mod takeout;
