//! Serial jwalk-based tree walker.

use std::path::{Path, PathBuf};
use std::time::Instant;

use jwalk::{Parallelism, WalkDir};
use tracing::{debug, warn};

use direhose_core::{HoseConfig, Record};
use direhose_sink::{Sink, Transmitter};

use crate::summary::WalkSummary;

/// Walks one directory tree and streams a record per entry.
///
/// A walker runs once: [`Walker::walk`] consumes it, and the end-of-stream
/// marker is emitted exactly when that call finishes.
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
}

impl Walker {
    /// Create a walker rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a walker rooted at the configured `start_dir`.
    pub fn from_config(config: &HoseConfig) -> Self {
        Self::new(&config.start_dir)
    }

    /// Root of the walk.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Visit every directory and file under the root, then end the stream.
    ///
    /// Nothing inside the walk is fatal: unreadable subtrees are logged and
    /// skipped, and per-entry failures are left to the record builder and
    /// the transmitter.
    pub fn walk<S: Sink>(self, transmitter: &mut Transmitter<S>) -> WalkSummary {
        let start = Instant::now();
        let mut summary = WalkSummary::default();

        if self.root().is_dir() {
            self.visit_tree(transmitter, &mut summary);
        } else {
            warn!(root = %self.root().display(), "Start directory is not a directory, nothing to walk");
        }

        summary.end_of_stream_sent = transmitter.end_stream();
        summary.transmit = transmitter.stats().clone();
        summary.elapsed = start.elapsed();
        summary
    }

    fn visit_tree<S: Sink>(&self, transmitter: &mut Transmitter<S>, summary: &mut WalkSummary) {
        // Files before subdirectories; native order is kept within each group.
        let walker = WalkDir::new(&self.root)
            .parallelism(Parallelism::Serial)
            .skip_hidden(false)
            .follow_links(false)
            .min_depth(0)
            .process_read_dir(|_depth, _path, _state, children| {
                children.sort_by_key(|child| {
                    matches!(child, Ok(entry) if entry.file_type.is_dir())
                });
            });

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    summary.enumeration_errors += 1;
                    let path = err.path().map(|p| p.display().to_string()).unwrap_or_default();
                    warn!(path = %path, "Cannot enumerate: {err}");
                    continue;
                }
            };

            let path = entry.path();
            // The root may be a symlink to a directory; it was checked with is_dir().
            if entry.depth == 0 || entry.file_type.is_dir() {
                summary.dirs_visited += 1;
                debug!(path = %path.display(), "Visiting directory");
            } else {
                summary.files_visited += 1;
            }

            // jwalk reports an unreadable directory as an Ok entry with no children.
            if let Some(err) = &entry.read_children_error {
                summary.enumeration_errors += 1;
                warn!(path = %path.display(), "Cannot enumerate: {err}");
            }

            transmitter.transmit(&Record::capture(&path));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use direhose_core::SourceMode;
    use direhose_sink::LocalSink;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir2")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join(".hidden"), "dot").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world world world").unwrap();
        fs::write(root.join("dir1/subdir/file3.txt"), "test").unwrap();
        fs::write(root.join("dir2/file4.txt"), "another file here").unwrap();

        temp
    }

    fn run(root: &Path, mode: SourceMode) -> (String, WalkSummary) {
        let mut tx = Transmitter::new(LocalSink::new(Vec::new()), mode, 1000);
        let summary = Walker::new(root).walk(&mut tx);
        let out = String::from_utf8(tx.into_parts().0.into_inner()).unwrap();
        (out, summary)
    }

    fn names(out: &str) -> Vec<String> {
        out.lines()
            .filter(|line| line.starts_with('{'))
            .map(|line| {
                let json: serde_json::Value = serde_json::from_str(line).unwrap();
                json["name"].as_str().unwrap().to_string()
            })
            .collect()
    }

    #[test]
    fn test_metadata_walk_counts_every_entry() {
        let temp = create_test_tree();
        assert_eq!(Walker::new(temp.path()).root(), temp.path());
        let (out, summary) = run(temp.path(), SourceMode::Metadata);

        // root, dir1, dir2, subdir + 5 files
        assert_eq!(summary.dirs_visited, 4);
        assert_eq!(summary.files_visited, 5);
        assert_eq!(names(&out).len(), 9);
        assert_eq!(summary.transmit.records_sent, 9);
        assert_eq!(out.lines().last(), Some("EOS"));
        assert!(summary.end_of_stream_sent);
    }

    #[test]
    fn test_directory_then_its_files_then_subdirectories() {
        let temp = create_test_tree();
        let root = std::path::absolute(temp.path()).unwrap();
        let (out, _) = run(temp.path(), SourceMode::Metadata);
        let names = names(&out);

        assert_eq!(names[0], root.to_string_lossy());

        let pos = |rel: &str| {
            let full = root.join(rel).to_string_lossy().into_owned();
            names.iter().position(|n| *n == full).unwrap()
        };
        // Files of the root come before any subdirectory.
        assert!(pos("file1.txt") < pos("dir1") && pos("file1.txt") < pos("dir2"));
        assert!(pos(".hidden") < pos("dir1") && pos(".hidden") < pos("dir2"));
        // A directory's own files precede its subdirectories.
        assert!(pos("dir1") < pos("dir1/file2.txt"));
        assert!(pos("dir1/file2.txt") < pos("dir1/subdir"));
        assert!(pos("dir1/subdir") < pos("dir1/subdir/file3.txt"));
    }

    #[test]
    fn test_unrecognized_mode_emits_only_eos() {
        let temp = create_test_tree();
        let (out, summary) = run(temp.path(), SourceMode::Unrecognized("none".into()));

        assert_eq!(out, "EOS\n");
        assert_eq!(summary.entries_visited(), 9);
    }

    #[test]
    fn test_missing_start_dir_still_ends_stream() {
        let temp = TempDir::new().unwrap();
        let (out, summary) = run(&temp.path().join("absent"), SourceMode::All);

        assert_eq!(out, "EOS\n");
        assert_eq!(summary.entries_visited(), 0);
        assert!(summary.end_of_stream_sent);
    }

    #[test]
    fn test_file_as_start_dir_walks_nothing() {
        let temp = create_test_tree();
        let (out, _) = run(&temp.path().join("file1.txt"), SourceMode::Metadata);
        assert_eq!(out, "EOS\n");
    }

    #[test]
    fn test_all_mode_example() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        fs::create_dir(&a).unwrap();
        fs::write(a.join("f.txt"), "test").unwrap();

        let (out, summary) = run(&a, SourceMode::All);
        let lines: Vec<&str> = out.lines().collect();

        let names = names(&out);

        assert_eq!(lines.len(), 4);
        assert_eq!(names.len(), 2);
        assert!(Path::new(&names[0]).ends_with("a"));
        assert!(Path::new(&names[1]).ends_with("a/f.txt"));
        assert_eq!(lines[2], "test");
        assert_eq!(lines[3], "EOS");
        assert_eq!(summary.transmit.files_streamed, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_is_reported_with_degraded_fields() {
        let temp = TempDir::new().unwrap();
        std::os::unix::fs::symlink(temp.path().join("nowhere"), temp.path().join("dangling"))
            .unwrap();

        let (out, summary) = run(temp.path(), SourceMode::All);
        assert_eq!(summary.files_visited, 1);
        assert_eq!(summary.transmit.read_failures, 1);

        let dangling = out
            .lines()
            .find(|line| line.contains("dangling"))
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(dangling).unwrap();
        assert_eq!(json["size"], "-");
        assert_eq!(json["last_modification"], "-");
        assert_eq!(out.lines().last(), Some("EOS"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_start_dir_counts_as_directory() {
        let temp = create_test_tree();
        let link_parent = TempDir::new().unwrap();
        let link = link_parent.path().join("tree");
        std::os::unix::fs::symlink(temp.path(), &link).unwrap();

        let (out, summary) = run(&link, SourceMode::Metadata);

        assert_eq!(summary.dirs_visited, 4);
        assert_eq!(summary.files_visited, 5);
        assert!(names(&out)[0].ends_with("tree"));
        assert_eq!(out.lines().last(), Some("EOS"));
    }
}
