//! Output side of direhose.
//!
//! A [`Sink`] is where the stream ends up: standard output ([`LocalSink`])
//! or a UDP endpoint ([`RemoteSink`]). The [`Transmitter`] sits in front of
//! a sink and decides, per [`Record`](direhose_core::Record), whether to
//! send its metadata, its content, or both.
//!
//! # Example
//!
//! ```rust,no_run
//! use direhose_core::{HoseConfig, Record};
//! use direhose_sink::{open_sink, Transmitter};
//!
//! let config = HoseConfig::default();
//! let sink = open_sink(&config).unwrap();
//! let mut transmitter = Transmitter::from_config(sink, &config);
//!
//! transmitter.transmit(&Record::capture(std::path::Path::new(".")));
//! transmitter.end_stream();
//! ```

mod error;
mod local;
mod remote;
mod sink;
mod transmitter;

pub use error::{SinkError, TransportError};
pub use local::LocalSink;
pub use remote::RemoteSink;
pub use sink::{END_OF_STREAM, Emission, Sink, SinkKind, open_sink};
pub use transmitter::{TransmitStats, Transmitter};
