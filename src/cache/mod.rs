//! Local cache for movie and person records fetched from the movie database
//!
//! Records are kept as one JSON file per key in a flat directory. The file name
//! is `<kind>_<id>.json`, which makes the directory readable by any other tool
//! that shares the same layout. Upstream "Nothing found." answers are turned into
//! a `not_found` marker on load so callers can tell a known miss from an
//! uncached key.

mod store;

pub use store::{
    not_found_marker, not_found_since, AccessError, Document, Kind, LocalStore, StoreError,
    UnknownKind, NOTHING_FOUND, NOT_FOUND_KEY,
};
