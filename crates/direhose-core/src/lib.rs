//! Core types for direhose.
//!
//! This crate holds the pieces every other direhose crate builds on: the
//! typed run configuration and its `key=value` file loader, the per-entry
//! [`Record`] that describes one visited path, and the error types raised
//! while setting a run up.

mod config;
mod error;
mod record;

pub use config::{
    DEFAULT_CHUNK_SIZE, DEFAULT_CONFIG_FILE, DEFAULT_NETWORK_HOST, DEFAULT_NETWORK_PORT,
    DEFAULT_START_DIR, HoseConfig, HoseConfigBuilder, RawConfig, SourceMode, SourceType,
};
pub use error::{ConfigError, ConfigWarning, WarningKind};
pub use record::{EntryKind, Field, Record, SENTINEL};
