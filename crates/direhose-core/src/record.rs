//! Per-entry records.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Local, SecondsFormat};
use serde::{Serialize, Serializer};
use tracing::debug;

/// Value written in place of a field that could not be determined.
pub const SENTINEL: &str = "-";

/// A record field that may be unavailable.
///
/// Serializes as the inner value, or as [`SENTINEL`] when unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<T> {
    /// The value was read successfully.
    Known(T),
    /// Reading the value failed.
    Unknown,
}

impl<T> Field<T> {
    /// Get the value, if known.
    pub fn known(&self) -> Option<&T> {
        match self {
            Field::Known(value) => Some(value),
            Field::Unknown => None,
        }
    }

    /// Check if the value is known.
    pub fn is_known(&self) -> bool {
        matches!(self, Field::Known(_))
    }
}

impl<T, E> From<Result<T, E>> for Field<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Field::Known(value),
            Err(_) => Field::Unknown,
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Known(value) => value.serialize(serializer),
            Field::Unknown => serializer.serialize_str(SENTINEL),
        }
    }
}

/// What kind of entry a record describes, as far as stat could tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory (symlinks are followed).
    Directory,
    /// Anything else that could be stat'ed.
    File,
    /// Stat failed.
    Unknown,
}

/// Description of one visited filesystem entry.
///
/// Serialized as a JSON object with the keys `package_ts`, `name`, `size`
/// and `last_modification`.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    /// When the record was built, ISO-8601 with local offset.
    #[serde(rename = "package_ts")]
    pub captured_at: String,

    /// Absolute, lexically normalized path.
    #[serde(rename = "name")]
    pub path: Field<String>,

    /// Size in bytes.
    pub size: Field<u64>,

    /// Modification time in seconds since the Unix epoch.
    pub last_modification: Field<f64>,

    #[serde(skip)]
    source: PathBuf,

    #[serde(skip)]
    kind: EntryKind,
}

impl Record {
    /// Build a record for `path`.
    ///
    /// Never fails: each field that cannot be read is set to unknown on its
    /// own and the rest of the record is still filled in.
    pub fn capture(path: &Path) -> Self {
        let captured_at = Local::now().to_rfc3339_opts(SecondsFormat::Micros, false);

        let resolved = match absolute_path(path) {
            Ok(abs) => Field::Known(abs.to_string_lossy().into_owned()),
            Err(err) => {
                debug!(path = %path.display(), "Cannot resolve path: {err}");
                Field::Unknown
            }
        };

        let (size, last_modification, kind) = match std::fs::metadata(path) {
            Ok(metadata) => {
                let kind = if metadata.is_dir() {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                };
                let modified = metadata.modified().map(epoch_seconds);
                if let Err(ref err) = modified {
                    debug!(path = %path.display(), "Cannot read modification time: {err}");
                }
                (Field::Known(metadata.len()), Field::from(modified), kind)
            }
            Err(err) => {
                debug!(path = %path.display(), "Cannot stat: {err}");
                (Field::Unknown, Field::Unknown, EntryKind::Unknown)
            }
        };

        let record = Self {
            captured_at,
            path: resolved,
            size,
            last_modification,
            source: path.to_path_buf(),
            kind,
        };
        debug!(path = %path.display(), "Record created");
        record
    }

    /// Path the record was built from, as handed in by the walker.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Entry kind determined at capture time.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Check if this record describes a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Serialize to a single line of JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Seconds since the Unix epoch; negative for times before it.
fn epoch_seconds(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

/// Make `path` absolute and drop `.` and `..` components without touching
/// the filesystem, so symlinks are left unresolved.
fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    let abs = std::path::absolute(path)?;
    let mut normalized = PathBuf::new();
    for component in abs.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}
