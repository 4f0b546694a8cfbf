//! File-per-key JSON store for movie and person records
//!
//! Provides a `LocalStore` rooted at a directory. Each record lives in its own
//! file named `<kind>_<id>.json`; the file holds either the raw upstream JSON or
//! whatever document the caller stored for that key.

use chrono::{DateTime, TimeZone, Utc};
use directories::ProjectDirs;
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// A decoded record: always a JSON object
pub type Document = Map<String, Value>;

/// Body the upstream movie database returns for unknown ids
pub const NOTHING_FOUND: &str = "Nothing found.";

/// Key of the synthetic marker returned for "nothing found" records
pub const NOT_FOUND_KEY: &str = "not_found";

/// Category of a cached record, used as the file name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Movie,
    Person,
}

impl Kind {
    /// File name prefix for this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            Kind::Movie => "movie",
            Kind::Person => "person",
        }
    }

}

/// Returned when a name is neither "movie" nor "person"
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown record kind: '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for Kind {
    type Err = UnknownKind;

    /// Parses "movie" or "person", ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "movie" => Ok(Kind::Movie),
            "person" => Ok(Kind::Person),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Underlying cause of a failed load or store
#[derive(Debug, Error)]
pub enum AccessError {
    /// Reading or writing the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file content is not valid JSON, or the value could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the local store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage directory does not exist and could not be created
    #[error("Failed to create storage dir {}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading or parsing a record failed
    #[error("Failed to load JSON from storage for file {}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: AccessError,
    },

    /// Encoding or writing a record failed
    #[error("Failed to store JSON to storage for file {}", .path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: AccessError,
    },

    /// The record parsed, but is not a JSON object
    #[error("Wrong data format, expected JSON object but was {found} in file {}", .path.display())]
    WrongFormat { found: &'static str, path: PathBuf },
}

/// Directory-backed key/value store for movie and person JSON records
///
/// Operations are plain synchronous filesystem calls. There is no locking:
/// two writers on the same key race and the last write wins.
#[derive(Debug, Clone)]
pub struct LocalStore {
    /// Directory holding the record files
    root: PathBuf,
}

impl LocalStore {
    /// Opens a store rooted at `root`, creating the directory and its parents
    ///
    /// # Returns
    /// * `Ok(LocalStore)` once the directory exists
    /// * `Err(StoreError::CreateDirectory)` if it cannot be created
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.is_dir() {
            debug!("creating storage dir {}", root.display());
            fs::create_dir_all(&root).map_err(|source| StoreError::CreateDirectory {
                path: root.clone(),
                source,
            })?;
        }
        Ok(Self { root })
    }

    /// XDG-compliant default location (`~/.cache/cineasts/` on Linux)
    ///
    /// Returns `None` if no home directory can be determined.
    pub fn default_dir() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "cineasts")?;
        Some(project_dirs.cache_dir().to_path_buf())
    }

    /// Directory holding the record files
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Backing file for a key: `<root>/<kind>_<id>.json`
    pub fn path_for(&self, kind: Kind, id: &str) -> PathBuf {
        self.root.join(format!("{}_{}.json", kind.prefix(), id))
    }

    /// Whether a backing file exists for the key; the content is not checked
    pub fn has(&self, kind: Kind, id: &str) -> bool {
        self.path_for(kind, id).exists()
    }

    /// Reads and decodes the record for a key
    ///
    /// A top-level array is unwrapped to its first element. An empty array or
    /// one starting with `"Nothing found."` yields a fresh `not_found` marker.
    ///
    /// # Returns
    /// * `Ok(Document)` with the record or the marker
    /// * `Err(StoreError::Load)` if the file is missing, unreadable or not JSON
    /// * `Err(StoreError::WrongFormat)` if the value is not a JSON object
    pub fn load(&self, kind: Kind, id: &str) -> Result<Document, StoreError> {
        let path = self.path_for(kind, id);
        let content = fs::read_to_string(&path).map_err(|source| {
            warn!("failed to read {}: {}", path.display(), source);
            StoreError::Load {
                path: path.clone(),
                source: source.into(),
            }
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|source| StoreError::Load {
            path: path.clone(),
            source: source.into(),
        })?;

        let document = decode(value, &path)?;
        debug!("loaded {} {} from {}", kind, id, path.display());
        Ok(document)
    }

    /// Serializes `data` as JSON and writes it to the key's file, replacing any
    /// previous content
    ///
    /// The write goes straight to the target file, so a crash mid-write can
    /// leave it truncated.
    pub fn store<T: Serialize + ?Sized>(
        &self,
        kind: Kind,
        id: &str,
        data: &T,
    ) -> Result<(), StoreError> {
        let path = self.path_for(kind, id);
        let json = serde_json::to_vec(data).map_err(|source| StoreError::Store {
            path: path.clone(),
            source: source.into(),
        })?;

        debug!("storing {} {} to {}", kind, id, path.display());
        fs::write(&path, json).map_err(|source| {
            warn!("failed to write {}: {}", path.display(), source);
            StoreError::Store {
                path,
                source: source.into(),
            }
        })
    }

    /// Whether a movie record is cached
    pub fn has_movie(&self, movie_id: &str) -> bool {
        self.has(Kind::Movie, movie_id)
    }

    /// Loads a movie record, see [`LocalStore::load`]
    pub fn load_movie(&self, movie_id: &str) -> Result<Document, StoreError> {
        self.load(Kind::Movie, movie_id)
    }

    /// Stores a movie record, see [`LocalStore::store`]
    pub fn store_movie<T: Serialize + ?Sized>(
        &self,
        movie_id: &str,
        movie: &T,
    ) -> Result<(), StoreError> {
        self.store(Kind::Movie, movie_id, movie)
    }

    /// Whether a person record is cached
    pub fn has_person(&self, person_id: &str) -> bool {
        self.has(Kind::Person, person_id)
    }

    /// Loads a person record, see [`LocalStore::load`]
    pub fn load_person(&self, person_id: &str) -> Result<Document, StoreError> {
        self.load(Kind::Person, person_id)
    }

    /// Stores a person record, see [`LocalStore::store`]
    pub fn store_person<T: Serialize + ?Sized>(
        &self,
        person_id: &str,
        person: &T,
    ) -> Result<(), StoreError> {
        self.store(Kind::Person, person_id, person)
    }
}

/// Builds a `{"not_found": <now in epoch millis>}` marker
pub fn not_found_marker() -> Document {
    let mut marker = Document::new();
    marker.insert(
        NOT_FOUND_KEY.to_string(),
        Value::from(Utc::now().timestamp_millis()),
    );
    marker
}

/// Capture time of a `not_found` marker, or `None` for a regular record
///
/// Markers never expire on their own; callers compare this against their own
/// refresh policy.
pub fn not_found_since(document: &Document) -> Option<DateTime<Utc>> {
    if document.len() != 1 {
        return None;
    }
    let millis = document.get(NOT_FOUND_KEY)?.as_i64()?;
    Utc.timestamp_millis_opt(millis).single()
}

fn decode(value: Value, path: &Path) -> Result<Document, StoreError> {
    let value = match value {
        Value::Array(items) => match items.into_iter().next() {
            None => return Ok(not_found_marker()),
            Some(Value::String(first)) if first == NOTHING_FOUND => {
                debug!("upstream had nothing for {}", path.display());
                return Ok(not_found_marker());
            }
            Some(first) => first,
        },
        other => other,
    };

    match value {
        Value::Object(document) => Ok(document),
        other => {
            let found = json_type_name(&other);
            warn!("expected JSON object in {} but was {}", path.display(), found);
            Err(StoreError::WrongFormat {
                found,
                path: path.to_path_buf(),
            })
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (LocalStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = LocalStore::open(temp_dir.path()).expect("Failed to open store");
        (store, temp_dir)
    }

    fn write_raw(store: &LocalStore, kind: Kind, id: &str, content: &str) {
        fs::write(store.path_for(kind, id), content).expect("Should write raw file");
    }

    #[test]
    fn test_store_movie_roundtrip() {
        let (store, _temp_dir) = create_test_store();

        assert!(!store.has_movie("42"), "Movie should be absent before store");

        store
            .store_movie("42", &json!({"title": "X"}))
            .expect("Store should succeed");

        assert!(store.has_movie("42"), "Movie should be present after store");
        let loaded = store.load_movie("42").expect("Load should succeed");
        assert_eq!(Value::Object(loaded), json!({"title": "X"}));
    }

    #[test]
    fn test_file_naming_uses_kind_prefix() {
        let (store, temp_dir) = create_test_store();

        store.store_movie("603", &json!({"id": 603})).unwrap();
        store.store_person("6384", &json!({"id": 6384})).unwrap();

        assert!(temp_dir.path().join("movie_603.json").exists());
        assert!(temp_dir.path().join("person_6384.json").exists());
        assert!(!store.has_person("603"), "Kinds must not share keys");
    }

    #[test]
    fn test_store_overwrites_existing_record() {
        let (store, _temp_dir) = create_test_store();

        store.store_person("1", &json!({"name": "first"})).unwrap();
        store.store_person("1", &json!({"name": "second"})).unwrap();

        let loaded = store.load_person("1").unwrap();
        assert_eq!(loaded.get("name"), Some(&json!("second")));
    }

    #[test]
    fn test_load_unwraps_first_array_element() {
        let (store, _temp_dir) = create_test_store();
        write_raw(&store, Kind::Movie, "7", r#"[{"title": "Se7en"}, {"title": "ignored"}]"#);

        let loaded = store.load_movie("7").unwrap();
        assert_eq!(loaded.get("title"), Some(&json!("Se7en")));
    }

    #[test]
    fn test_nothing_found_returns_marker() {
        let (store, _temp_dir) = create_test_store();
        write_raw(&store, Kind::Movie, "404", r#"["Nothing found."]"#);

        let before = Utc::now().timestamp_millis();
        let loaded = store.load_movie("404").unwrap();
        let after = Utc::now().timestamp_millis();

        let captured = loaded
            .get(NOT_FOUND_KEY)
            .and_then(Value::as_i64)
            .expect("Marker should carry a numeric timestamp");
        assert!(captured >= before && captured <= after);
    }

    #[test]
    fn test_nothing_found_first_element_wins() {
        let (store, _temp_dir) = create_test_store();
        write_raw(&store, Kind::Movie, "1", r#"["Nothing found.", {"title": "X"}]"#);

        let loaded = store.load_movie("1").unwrap();
        assert!(loaded.contains_key(NOT_FOUND_KEY));
        assert!(!loaded.contains_key("title"));
    }

    #[test]
    fn test_empty_array_returns_marker() {
        let (store, _temp_dir) = create_test_store();
        write_raw(&store, Kind::Person, "0", "[]");

        let loaded = store.load_person("0").unwrap();
        assert!(not_found_since(&loaded).is_some());
    }

    #[test]
    fn test_bare_string_is_wrong_format() {
        let (store, _temp_dir) = create_test_store();
        write_raw(&store, Kind::Person, "9", r#""Keanu""#);

        let err = store.load_person("9").unwrap_err();
        match &err {
            StoreError::WrongFormat { found, path } => {
                assert_eq!(*found, "string");
                assert!(path.ends_with("person_9.json"));
            }
            other => panic!("Expected WrongFormat, got {:?}", other),
        }
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn test_null_is_wrong_format() {
        let (store, _temp_dir) = create_test_store();
        write_raw(&store, Kind::Movie, "n", "null");
        write_raw(&store, Kind::Movie, "ln", "[null]");

        for id in ["n", "ln"] {
            match store.load_movie(id) {
                Err(StoreError::WrongFormat { found, .. }) => assert_eq!(found, "null"),
                other => panic!("Expected WrongFormat for {}, got {:?}", id, other),
            }
        }
    }

    #[test]
    fn test_nested_array_is_wrong_format() {
        let (store, _temp_dir) = create_test_store();
        write_raw(&store, Kind::Movie, "a", "[[1, 2]]");

        match store.load_movie("a") {
            Err(StoreError::WrongFormat { found, .. }) => assert_eq!(found, "array"),
            other => panic!("Expected WrongFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_record_is_load_error() {
        let (store, _temp_dir) = create_test_store();

        match store.load_movie("missing") {
            Err(StoreError::Load { path, source }) => {
                assert!(path.ends_with("movie_missing.json"));
                assert!(matches!(source, AccessError::Io(_)));
            }
            other => panic!("Expected Load error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_invalid_json_is_load_error() {
        let (store, _temp_dir) = create_test_store();
        write_raw(&store, Kind::Movie, "bad", "{\"title\": ");

        let err = store.load_movie("bad").unwrap_err();
        assert!(matches!(
            err,
            StoreError::Load {
                source: AccessError::Json(_),
                ..
            }
        ));
        assert!(err.to_string().contains("movie_bad.json"));
    }

    #[test]
    fn test_has_does_not_validate_content() {
        let (store, _temp_dir) = create_test_store();
        write_raw(&store, Kind::Movie, "junk", "not json at all");

        assert!(store.has_movie("junk"));
    }

    #[test]
    fn test_store_into_removed_root_is_store_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("s");
        let store = LocalStore::open(&root).expect("Open should succeed");
        fs::remove_dir_all(&root).expect("Should remove store root");

        match store.store_movie("1", &json!({"title": "X"})) {
            Err(StoreError::Store {
                path,
                source: AccessError::Io(_),
            }) => assert!(path.ends_with("movie_1.json")),
            other => panic!("Expected Store error, got {:?}", other),
        }
    }

    #[test]
    fn test_open_creates_nested_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("store").join("dir");

        let store = LocalStore::open(&nested_path).expect("Open should succeed");

        assert!(nested_path.is_dir(), "Nested directory should be created");
        assert_eq!(store.root(), nested_path.as_path());
    }

    #[test]
    fn test_open_fails_when_root_is_a_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file_path = temp_dir.path().join("occupied");
        fs::write(&file_path, "x").unwrap();

        match LocalStore::open(&file_path) {
            Err(StoreError::CreateDirectory { path, .. }) => assert_eq!(path, file_path),
            other => panic!("Expected CreateDirectory error, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_since_ignores_regular_documents() {
        let mut document = Document::new();
        document.insert("title".to_string(), json!("X"));
        assert!(not_found_since(&document).is_none());

        document.insert(NOT_FOUND_KEY.to_string(), json!(1));
        assert!(not_found_since(&document).is_none(), "Marker has a single key");

        let marker = not_found_marker();
        let since = not_found_since(&marker).expect("Marker should have a capture time");
        assert!(since <= Utc::now());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("movie".parse::<Kind>(), Ok(Kind::Movie));
        assert_eq!("Person".parse::<Kind>(), Ok(Kind::Person));
        assert_eq!("people".parse::<Kind>(), Err(UnknownKind("people".to_string())));
        assert_eq!("actor".parse::<Kind>(), Err(UnknownKind("actor".to_string())));
        assert_eq!(Kind::Movie.to_string(), "movie");
    }

    #[test]
    fn test_default_dir_is_xdg_compliant() {
        if let Some(dir) = LocalStore::default_dir() {
            assert!(dir.to_string_lossy().contains("cineasts"));
        }
        // Passes when no home directory is available (e.g., in CI)
    }
}
