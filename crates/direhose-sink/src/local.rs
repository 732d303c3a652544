//! Console sink.

use std::io::{BufWriter, Stdout, Write};

use crate::error::TransportError;
use crate::sink::{Emission, Sink, SinkKind};

/// Writes the stream to a local writer, standard output by default.
///
/// Output is buffered and flushed when the end-of-stream marker is written.
/// Dropping the sink flushes whatever is left.
#[derive(Debug)]
pub struct LocalSink<W: Write = BufWriter<Stdout>> {
    out: W,
}

impl LocalSink<BufWriter<Stdout>> {
    /// Create a sink writing to standard output.
    pub fn stdout() -> Self {
        Self::new(BufWriter::new(std::io::stdout()))
    }
}

impl<W: Write> LocalSink<W> {
    /// Create a sink writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for LocalSink<W> {
    fn emit(&mut self, emission: Emission<'_>) -> Result<(), TransportError> {
        let io = |e| TransportError::io(SinkKind::Local, e);
        self.out.write_all(&emission.console_bytes()).map_err(io)?;
        if emission == Emission::EndOfStream {
            self.out.flush().map_err(io)?;
        }
        Ok(())
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writes_framed_units() {
        let mut sink = LocalSink::new(Vec::new());
        sink.emit(Emission::Record("{\"name\":\"a\"}")).unwrap();
        sink.emit(Emission::Chunk(b"te")).unwrap();
        sink.emit(Emission::Chunk(b"st")).unwrap();
        sink.emit(Emission::Delimiter).unwrap();
        sink.emit(Emission::EndOfStream).unwrap();

        assert_eq!(sink.get_ref().as_slice(), b"{\"name\":\"a\"}\ntest\nEOS\n");
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut sink = LocalSink::new(BrokenPipe);
        let err = sink.emit(Emission::Delimiter).unwrap_err();
        assert!(matches!(err, TransportError::Io { sink: SinkKind::Local, .. }));
    }
}
