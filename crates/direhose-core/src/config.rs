//! Run configuration and the `key=value` config file loader.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::EnumString;
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigWarning, WarningKind};

/// Config file read on start-up when none is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "./direhose.conf";

/// Directory the walk starts from.
pub const DEFAULT_START_DIR: &str = ".";

/// Destination host for the remote sink.
pub const DEFAULT_NETWORK_HOST: &str = "127.0.0.1";

/// Destination port for the remote sink.
pub const DEFAULT_NETWORK_PORT: u16 = 7654;

/// Size of each content chunk in `data` mode.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Where the stream goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Standard output.
    #[default]
    Local,
    /// UDP datagrams to `network_host:network_port`.
    Remote,
}

impl SourceType {
    /// Interpret a config value: `local` selects stdout, anything else the network.
    pub fn from_value(value: &str) -> Self {
        if value == "local" {
            Self::Local
        } else {
            Self::Remote
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// What is sent for each visited entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceMode {
    /// One structured record per entry.
    #[default]
    Metadata,
    /// Raw file content, chunked.
    Data,
    /// Metadata followed by content.
    All,
    /// Any other value. Nothing is sent for any entry.
    #[strum(default)]
    Unrecognized(String),
}

impl SourceMode {
    /// Interpret a config value. Matching is exact and case-sensitive.
    pub fn from_value(value: &str) -> Self {
        Self::from_str(value).unwrap_or_else(|_| Self::Unrecognized(value.to_string()))
    }

    /// Whether a metadata record is sent per entry.
    pub fn sends_metadata(&self) -> bool {
        matches!(self, Self::Metadata | Self::All)
    }

    /// Whether file content is sent per entry.
    pub fn sends_data(&self) -> bool {
        matches!(self, Self::Data | Self::All)
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata => f.write_str("metadata"),
            Self::Data => f.write_str("data"),
            Self::All => f.write_str("all"),
            Self::Unrecognized(value) => f.write_str(value),
        }
    }
}

/// Key/value pairs read from a config file, in file order.
///
/// Later occurrences of a key overwrite earlier ones. Lines that cannot be
/// split into a key and a value are skipped and reported as warnings.
#[derive(Debug, Clone, Default)]
pub struct RawConfig {
    entries: IndexMap<String, String>,
    warnings: Vec<ConfigWarning>,
}

impl RawConfig {
    /// Parse config file text.
    pub fn parse(text: &str) -> Self {
        let mut raw = Self::default();

        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                raw.warnings
                    .push(ConfigWarning::new(idx + 1, line, WarningKind::MissingSeparator));
                continue;
            };

            let key = key.trim();
            if key.is_empty() {
                raw.warnings
                    .push(ConfigWarning::new(idx + 1, line, WarningKind::EmptyKey));
                continue;
            }

            raw.entries.insert(key.to_string(), value.trim().to_string());
        }

        raw
    }

    /// Read and parse a config file. Returns `None` if the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(Self::parse(&text))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ConfigError::io(path, err)),
        }
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// All parsed pairs, in the order keys first appeared.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Lines that were skipped.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }
}

/// Configuration for a single run. Built once and never mutated.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct HoseConfig {
    /// Root of the walk.
    #[builder(default = "PathBuf::from(DEFAULT_START_DIR)")]
    pub start_dir: PathBuf,

    /// Local or remote sink.
    #[builder(default)]
    #[serde(default)]
    pub source_type: SourceType,

    /// What to send per entry.
    #[builder(default)]
    #[serde(default)]
    pub source_mode: SourceMode,

    /// Remote sink host.
    #[builder(default = "DEFAULT_NETWORK_HOST.to_string()")]
    pub network_host: String,

    /// Remote sink port.
    #[builder(default = "DEFAULT_NETWORK_PORT")]
    pub network_port: u16,

    /// Bytes per content chunk.
    #[builder(default = "DEFAULT_CHUNK_SIZE")]
    pub chunk_size: usize,

    /// Keys present in the config file that direhose does not use.
    #[builder(default)]
    #[serde(default)]
    pub extra: IndexMap<String, String>,
}

impl HoseConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref start_dir) = self.start_dir {
            if start_dir.as_os_str().is_empty() {
                return Err("start_dir cannot be empty".to_string());
            }
        }
        if self.chunk_size == Some(0) {
            return Err("chunk_size must be greater than zero".to_string());
        }
        if let Some(ref host) = self.network_host {
            if host.is_empty() {
                return Err("network_host cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl HoseConfig {
    /// Create a new config builder.
    pub fn builder() -> HoseConfigBuilder {
        HoseConfigBuilder::default()
    }

    /// Create a default config walking `start_dir`.
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: start_dir.into(),
            source_type: SourceType::Local,
            source_mode: SourceMode::Metadata,
            network_host: DEFAULT_NETWORK_HOST.to_string(),
            network_port: DEFAULT_NETWORK_PORT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            extra: IndexMap::new(),
        }
    }

    /// Load the config file at `path`, overlaying its values on the defaults.
    ///
    /// A missing file is not an error. Malformed lines are logged and
    /// skipped; a recognized key with an unusable value fails the load.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let shown = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

        let Some(raw) = RawConfig::read(path)? else {
            debug!(path = %shown.display(), "No config file found, using defaults");
            return Ok(Self::default());
        };

        debug!(path = %shown.display(), "Using config file");
        for warning in raw.warnings() {
            warn!("Skipping malformed config {}", warning.message());
        }

        Self::from_raw(&raw)
    }

    /// Build a typed config from parsed key/value pairs.
    pub fn from_raw(raw: &RawConfig) -> Result<Self, ConfigError> {
        let mut builder = Self::builder();
        let mut extra = IndexMap::new();

        for (key, value) in raw.entries() {
            debug!("For {key} using {value}");
            match key {
                "start_dir" => {
                    builder.start_dir(value);
                }
                "source_type" => {
                    builder.source_type(SourceType::from_value(value));
                }
                "source_mode" => {
                    builder.source_mode(SourceMode::from_value(value));
                }
                "network_host" => {
                    builder.network_host(value);
                }
                "network_port" => {
                    let port: u16 = parse_number(key, value)?;
                    if port == 0 {
                        return Err(ConfigError::invalid_value(key, value, "port must be non-zero"));
                    }
                    builder.network_port(port);
                }
                "chunk_size" => {
                    builder.chunk_size(parse_number::<usize>(key, value)?);
                }
                _ => {
                    extra.insert(key.to_string(), value.to_string());
                }
            }
        }

        builder.extra(extra);
        builder.build().map_err(|e| ConfigError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Remote destination as a host/port pair.
    pub fn endpoint(&self) -> (&str, u16) {
        (self.network_host.as_str(), self.network_port)
    }
}

impl Default for HoseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_START_DIR)
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|e| ConfigError::invalid_value(key, value, e))
}
