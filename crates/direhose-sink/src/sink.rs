//! The sink abstraction.

use std::borrow::Cow;
use std::fmt;
use std::net::SocketAddr;

use direhose_core::{HoseConfig, SourceType};

use crate::error::{SinkError, TransportError};
use crate::local::LocalSink;
use crate::remote::RemoteSink;

/// Literal sent as the last unit of every completed stream.
pub const END_OF_STREAM: &str = "EOS";

/// One unit handed to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission<'a> {
    /// A serialized metadata record.
    Record(&'a str),
    /// A slice of raw file content.
    Chunk(&'a [u8]),
    /// Marks the end of one file's content.
    Delimiter,
    /// Marks the end of the stream.
    EndOfStream,
}

impl Emission<'_> {
    /// Bytes written to a console. Text units are newline-terminated,
    /// chunks are passed through untouched.
    pub fn console_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Emission::Record(line) => Cow::Owned(format!("{line}\n").into_bytes()),
            Emission::Chunk(bytes) => Cow::Borrowed(bytes),
            Emission::Delimiter => Cow::Borrowed(b"\n"),
            Emission::EndOfStream => Cow::Owned(format!("{END_OF_STREAM}\n").into_bytes()),
        }
    }

    /// Payload of the datagram carrying this unit.
    pub fn datagram(&self) -> Cow<'_, [u8]> {
        match self {
            Emission::Record(line) => Cow::Owned(format!("{line}\n").into_bytes()),
            Emission::Chunk(bytes) => Cow::Borrowed(bytes),
            Emission::Delimiter => Cow::Borrowed(b"\n"),
            Emission::EndOfStream => Cow::Borrowed(END_OF_STREAM.as_bytes()),
        }
    }
}

/// Identity of a sink, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// Standard output or another local writer.
    Local,
    /// A UDP destination.
    Remote { addr: SocketAddr },
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::Local => f.write_str("stdout"),
            SinkKind::Remote { addr } => write!(f, "{addr}"),
        }
    }
}

/// Destination for emitted units.
pub trait Sink {
    /// Send one unit. Failures concern this unit only.
    fn emit(&mut self, emission: Emission<'_>) -> Result<(), TransportError>;

    /// Which sink this is.
    fn kind(&self) -> SinkKind;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn emit(&mut self, emission: Emission<'_>) -> Result<(), TransportError> {
        (**self).emit(emission)
    }

    fn kind(&self) -> SinkKind {
        (**self).kind()
    }
}

/// Open the sink selected by `source_type`.
pub fn open_sink(config: &HoseConfig) -> Result<Box<dyn Sink>, SinkError> {
    match config.source_type {
        SourceType::Local => Ok(Box::new(LocalSink::stdout())),
        SourceType::Remote => {
            let (host, port) = config.endpoint();
            Ok(Box::new(RemoteSink::connect(host, port)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_framing() {
        assert_eq!(&*Emission::Record("{}").console_bytes(), b"{}\n");
        assert_eq!(&*Emission::Chunk(b"ab").console_bytes(), b"ab");
        assert_eq!(&*Emission::Delimiter.console_bytes(), b"\n");
        assert_eq!(&*Emission::EndOfStream.console_bytes(), b"EOS\n");
    }

    #[test]
    fn test_datagram_framing() {
        assert_eq!(&*Emission::Record("{}").datagram(), b"{}\n");
        assert_eq!(&*Emission::Chunk(b"ab").datagram(), b"ab");
        assert_eq!(&*Emission::Delimiter.datagram(), b"\n");
        assert_eq!(&*Emission::EndOfStream.datagram(), b"EOS");
    }

    #[test]
    fn test_sink_kind_display() {
        assert_eq!(SinkKind::Local.to_string(), "stdout");
        let addr: SocketAddr = "127.0.0.1:7654".parse().unwrap();
        assert_eq!(SinkKind::Remote { addr }.to_string(), "127.0.0.1:7654");
    }

    #[test]
    fn test_open_local_sink() {
        let sink = open_sink(&HoseConfig::default()).unwrap();
        assert_eq!(sink.kind(), SinkKind::Local);
    }
}
