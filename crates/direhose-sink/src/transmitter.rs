//! Per-record transmission policy.

use std::fs::File;
use std::io::{self, Read};

use direhose_core::{HoseConfig, Record, SourceMode};
use tracing::{debug, error};

use crate::error::TransportError;
use crate::sink::{Emission, Sink};

/// Counters for everything a transmitter sent or failed to send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransmitStats {
    /// Metadata records delivered to the sink.
    pub records_sent: u64,
    /// Content chunks delivered to the sink.
    pub chunks_sent: u64,
    /// Content bytes delivered to the sink.
    pub bytes_sent: u64,
    /// Files whose content was sent completely, delimiter included.
    pub files_streamed: u64,
    /// Units the sink rejected.
    pub transport_failures: u64,
    /// Files that could not be opened or read.
    pub read_failures: u64,
}

/// Turns records into sink emissions according to the source mode.
#[derive(Debug)]
pub struct Transmitter<S: Sink> {
    sink: S,
    mode: SourceMode,
    buf: Vec<u8>,
    stats: TransmitStats,
}

impl<S: Sink> Transmitter<S> {
    /// Create a transmitter reading content in chunks of `chunk_size` bytes.
    pub fn new(sink: S, mode: SourceMode, chunk_size: usize) -> Self {
        Self {
            sink,
            mode,
            buf: vec![0; chunk_size.max(1)],
            stats: TransmitStats::default(),
        }
    }

    /// Create a transmitter using the mode and chunk size from `config`.
    pub fn from_config(sink: S, config: &HoseConfig) -> Self {
        Self::new(sink, config.source_mode.clone(), config.chunk_size)
    }

    /// Send whatever the mode calls for. In `all` mode metadata goes first.
    /// Unrecognized modes send nothing.
    pub fn transmit(&mut self, record: &Record) {
        if self.mode.sends_metadata() {
            self.send_metadata(record);
        }
        if self.mode.sends_data() {
            self.send_data(record);
        }
    }

    /// Emit the end-of-stream marker. Returns whether it was delivered.
    pub fn end_stream(&mut self) -> bool {
        debug!("End of stream");
        match self.sink.emit(Emission::EndOfStream) {
            Ok(()) => true,
            Err(err) => {
                self.stats.transport_failures += 1;
                error!("{err}");
                false
            }
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> &TransmitStats {
        &self.stats
    }

    /// The sink being written to.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Give back the sink and the final counters.
    pub fn into_parts(self) -> (S, TransmitStats) {
        (self.sink, self.stats)
    }

    fn send_metadata(&mut self, record: &Record) {
        debug!(path = %record.source().display(), "Sending metadata");
        let result = record
            .to_json()
            .map_err(TransportError::from)
            .and_then(|line| self.sink.emit(Emission::Record(&line)));

        match result {
            Ok(()) => self.stats.records_sent += 1,
            Err(err) => {
                self.stats.transport_failures += 1;
                error!("{err}");
            }
        }
    }

    fn send_data(&mut self, record: &Record) {
        if record.is_dir() {
            debug!(path = %record.source().display(), "Directory, no content to send");
            return;
        }

        let path = record.source();
        debug!(path = %path.display(), "Sending content");
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                self.stats.read_failures += 1;
                error!(path = %path.display(), "Cannot open: {err}");
                return;
            }
        };

        loop {
            let n = match fill_chunk(&mut file, &mut self.buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) => {
                    self.stats.read_failures += 1;
                    error!(path = %path.display(), "Read failed: {err}");
                    return;
                }
            };

            if let Err(err) = self.sink.emit(Emission::Chunk(&self.buf[..n])) {
                self.stats.transport_failures += 1;
                error!(path = %path.display(), "{err}");
                return;
            }
            self.stats.chunks_sent += 1;
            self.stats.bytes_sent += n as u64;
        }

        if let Err(err) = self.sink.emit(Emission::Delimiter) {
            self.stats.transport_failures += 1;
            error!(path = %path.display(), "{err}");
            return;
        }
        self.stats.files_streamed += 1;
    }
}

/// Read until `buf` is full or the reader is exhausted.
fn fill_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
