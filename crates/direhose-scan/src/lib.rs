//! Directory walking engine for direhose.
//!
//! [`Walker`] traverses the tree under a start directory with jwalk in
//! serial mode and hands a [`Record`](direhose_core::Record) for every
//! directory and file to a [`Transmitter`](direhose_sink::Transmitter).
//! Each directory is reported before the files directly inside it, and
//! those files before any of its subdirectories. When the tree is
//! exhausted the end-of-stream marker is emitted once.
//!
//! # Example
//!
//! ```rust,no_run
//! use direhose_core::HoseConfig;
//! use direhose_scan::Walker;
//! use direhose_sink::{open_sink, Transmitter};
//!
//! let config = HoseConfig::new("/var/log");
//! let mut transmitter = Transmitter::from_config(open_sink(&config).unwrap(), &config);
//! let summary = Walker::from_config(&config).walk(&mut transmitter);
//!
//! eprintln!("{} entries streamed", summary.entries_visited());
//! ```

mod summary;
mod walker;

pub use summary::WalkSummary;
pub use walker::Walker;

// Re-export core types for convenience
pub use direhose_core::{HoseConfig, Record, SourceMode};
pub use direhose_sink::{Sink, TransmitStats, Transmitter};
