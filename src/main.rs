//! direhose - stream a directory tree to stdout or over UDP.
//!
//! Usage:
//!   direhose                 Walk using ./direhose.conf (or defaults)
//!   direhose [CONFIG_FILE]   Walk using the given config file
//!   direhose -v ...          Also log debug details to stderr
//!   direhose --help          Show help

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use direhose_core::{DEFAULT_CONFIG_FILE, HoseConfig};
use direhose_scan::{WalkSummary, Walker};
use direhose_sink::{Sink, Transmitter, open_sink};

const CRATES: [&str; 4] = ["direhose", "direhose_core", "direhose_sink", "direhose_scan"];

#[derive(Parser)]
#[command(
    name = "direhose",
    version,
    about = "Walk a directory tree and stream what it finds",
    long_about = "direhose walks the tree under `start_dir` and emits one JSON record per \
                  directory and file, the raw file content, or both, followed by an `EOS` \
                  line. Output goes to stdout or, with a non-local `source_type`, to \
                  `network_host:network_port` as UDP datagrams.\n\n\
                  Settings are read from CONFIG_FILE as `key=value` lines; a missing file \
                  means defaults."
)]
struct Cli {
    /// Configuration file
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    config_file: PathBuf,

    /// Log debug details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = HoseConfig::load(&cli.config_file)
        .wrap_err_with(|| format!("Cannot load config {}", cli.config_file.display()))?;
    debug!(?config, "Effective configuration");

    let sink = open_sink(&config).context("Cannot open output")?;
    info!(
        root = %config.start_dir.display(),
        mode = %config.source_mode,
        sink = %sink.kind(),
        "Streaming"
    );

    let mut transmitter = Transmitter::from_config(sink, &config);
    let summary = Walker::from_config(&config).walk(&mut transmitter);
    report(&summary);

    Ok(())
}

/// Log to stderr; stdout carries the stream.
fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(directives("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives("info")))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn directives(level: &str) -> String {
    let mut parts: Vec<String> = CRATES.iter().map(|c| format!("{c}={level}")).collect();
    parts.push("warn".to_string());
    parts.join(",")
}

fn report(summary: &WalkSummary) {
    info!(
        dirs = summary.dirs_visited,
        files = summary.files_visited,
        records = summary.transmit.records_sent,
        chunks = summary.transmit.chunks_sent,
        content = %format_size(summary.transmit.bytes_sent),
        errors = summary.error_count(),
        "Walk finished in {:.2}s",
        summary.elapsed.as_secs_f64()
    );

    if !summary.end_of_stream_sent {
        warn!("End-of-stream marker was not delivered");
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
