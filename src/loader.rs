//! Populating a dictionary from a JSON word list.
//!
//! The input is a single JSON object mapping each word to its definition:
//!
//! ```json
//! { "cat": "a small feline", "dog": "a domesticated canine" }
//! ```
//!
//! String definitions are stored as their contents; any other JSON value is
//! stored as its compact JSON text.
//!
//! Entries are inserted in file order. When lower-casing maps two words to the
//! same key, the definition that appears first in the file is kept.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::HybridTst;

/// Error type for loading a word list.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The word list could not be opened or read.
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from a caller-supplied reader failed.
    #[error("failed to read word list")]
    Read(#[source] std::io::Error),

    /// The input is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level JSON value is not an object.
    #[error("expected a JSON object mapping words to definitions, found {0}")]
    NotAnObject(&'static str),

    /// A word breaks the dictionary's key contract and skipping is off.
    #[error("cannot insert word {word:?}")]
    Key {
        word: String,
        #[source]
        source: crate::Error,
    },
}

/// Options controlling how words are inserted.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Lower-case every word before insertion
    pub lowercase: bool,
    /// Skip words the dictionary rejects instead of failing the load
    pub skip_invalid: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            lowercase: true,
            skip_invalid: false,
        }
    }
}

/// Counts gathered while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Words inserted as new keys
    pub inserted: usize,
    /// Words whose key was already present (the first definition is kept)
    pub duplicates: usize,
    /// Words rejected by the dictionary and skipped
    pub skipped: usize,
}

/// A populated dictionary together with its load report.
#[derive(Debug)]
pub struct Loaded {
    pub dictionary: HybridTst<String>,
    pub report: LoadReport,
}

/// Loads the word list at `path`.
pub fn load_path(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Loaded, LoadError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "opening word list");
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // A directory opens fine on Linux and only fails once read.
    let value = parse_reader(BufReader::new(file)).map_err(|err| match err {
        LoadError::Read(source) => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    load_value(value, options)
}

pub fn load_reader(reader: impl Read, options: &LoadOptions) -> Result<Loaded, LoadError> {
    let value = parse_reader(reader)?;
    load_value(value, options)
}

/// serde_json reports read failures as its own error; split them back out.
fn parse_reader(reader: impl Read) -> Result<Value, LoadError> {
    serde_json::from_reader(reader).map_err(|err| {
        if err.is_io() {
            LoadError::Read(err.into())
        } else {
            LoadError::Json(err)
        }
    })
}

pub fn load_str(json: &str, options: &LoadOptions) -> Result<Loaded, LoadError> {
    let value: Value = serde_json::from_str(json)?;
    load_value(value, options)
}

fn load_value(value: Value, options: &LoadOptions) -> Result<Loaded, LoadError> {
    let entries = match value {
        Value::Object(entries) => entries,
        other => return Err(LoadError::NotAnObject(json_kind(&other))),
    };

    let mut dictionary = HybridTst::new();
    let mut report = LoadReport::default();
    for (word, definition) in entries {
        let word = if options.lowercase {
            word.to_lowercase()
        } else {
            word
        };
        let definition = match definition {
            Value::String(text) => text,
            other => other.to_string(),
        };

        match dictionary.put(&word, definition) {
            Ok(true) => report.inserted += 1,
            Ok(false) => report.duplicates += 1,
            Err(err) if options.skip_invalid => {
                warn!(word = %word, error = %err, "skipping word");
                report.skipped += 1;
            }
            Err(source) => return Err(LoadError::Key { word, source }),
        }
    }

    info!(
        inserted = report.inserted,
        duplicates = report.duplicates,
        skipped = report.skipped,
        "loaded word list"
    );
    Ok(Loaded { dictionary, report })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
