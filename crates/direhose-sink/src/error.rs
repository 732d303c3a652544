//! Error types for sinks.

use std::net::SocketAddr;

use thiserror::Error;

use crate::sink::SinkKind;

/// Errors raised while setting a sink up. These happen before the walk.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The remote endpoint could not be resolved.
    #[error("Cannot resolve {endpoint}: {source}")]
    Resolve {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// The remote endpoint resolved to no address.
    #[error("No address found for {endpoint}")]
    NoAddress { endpoint: String },

    /// The local datagram socket could not be bound.
    #[error("Cannot bind datagram socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// A single emission that did not make it out. Never fatal to the walk.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Writing or sending failed.
    #[error("Send to {sink} failed: {source}")]
    Io {
        sink: SinkKind,
        #[source]
        source: std::io::Error,
    },

    /// The socket accepted only part of a datagram.
    #[error("Datagram to {addr} truncated: sent {sent} of {len} bytes")]
    Truncated {
        addr: SocketAddr,
        sent: usize,
        len: usize,
    },

    /// A record could not be turned into JSON.
    #[error("Cannot serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl TransportError {
    /// Create an I/O error for the given sink.
    pub fn io(sink: SinkKind, source: std::io::Error) -> Self {
        Self::Io { sink, source }
    }
}
