//! Walk results.

use std::time::Duration;

use direhose_sink::TransmitStats;

/// What a finished walk did.
#[derive(Debug, Clone, Default)]
pub struct WalkSummary {
    /// Directories visited, the start directory included.
    pub dirs_visited: u64,
    /// Non-directory entries visited.
    pub files_visited: u64,
    /// Directories or entries that could not be enumerated.
    pub enumeration_errors: u64,
    /// Counters from the transmitter.
    pub transmit: TransmitStats,
    /// Whether the end-of-stream marker reached the sink.
    pub end_of_stream_sent: bool,
    /// Time taken by the walk.
    pub elapsed: Duration,
}

impl WalkSummary {
    /// Total entries visited (directories + files).
    pub fn entries_visited(&self) -> u64 {
        self.dirs_visited + self.files_visited
    }

    /// Total problems met along the way.
    pub fn error_count(&self) -> u64 {
        self.enumeration_errors + self.transmit.transport_failures + self.transmit.read_failures
    }

    /// Entries visited per second.
    pub fn entries_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.entries_visited() as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}
