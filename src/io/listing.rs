//! Directory listing consumer
//!
//! Reads `ls -l` style output line by line, keeps the regular-file entries,
//! totals their sizes, and sorts them largest first. [`run_listing`] spawns
//! the producer itself and reads its stdout through a pipe.

use crate::types::BankError;
use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Fields before the name: permissions, links, owner, group, size, month, day, time
const FIXED_FIELDS: usize = 8;

/// One parsed listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub permissions: String,
    pub size: u64,
    /// Month, day and time (or year) as listed
    pub timestamp: String,
    pub name: String,
}

/// Parse one line of `ls -l` output
///
/// Returns `None` for directory entries, the `total` header, and any line
/// that lacks the expected fields or whose size is not a number. Names with
/// spaces are rejoined with single spaces.
pub fn parse_listing_line(line: &str) -> Option<FileEntry> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.starts_with('d') || line.starts_with("total") {
        return None;
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() <= FIXED_FIELDS {
        return None;
    }

    let size = fields[4].parse::<u64>().ok()?;
    Some(FileEntry {
        permissions: fields[0].to_string(),
        size,
        timestamp: fields[5..FIXED_FIELDS].join(" "),
        name: fields[FIXED_FIELDS..].join(" "),
    })
}

/// Result of consuming a listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingSummary {
    /// Parsed entries, largest first; ties keep listing order
    pub entries: Vec<FileEntry>,
    /// Sum of entry sizes
    pub total_bytes: u64,
    /// Every line read, parsed or not
    pub lines_read: usize,
    /// Time spent reading and sorting
    pub elapsed: Duration,
}

impl fmt::Display for ListingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Processed {} files in {:.3} ms",
            self.entries.len(),
            self.elapsed.as_secs_f64() * 1000.0
        )?;
        writeln!(f, "Total size: {} bytes", self.total_bytes)?;
        writeln!(f)?;
        writeln!(f, "Files sorted by size:")?;
        for entry in &self.entries {
            writeln!(f, "{} ({} bytes)", entry.name, entry.size)?;
        }
        Ok(())
    }
}

/// Consume listing lines from `reader` until end of input
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the read.
///
/// # Errors
///
/// - `BankError::IoError` if reading fails
pub fn consume_listing<R: BufRead>(reader: R) -> Result<ListingSummary, BankError> {
    let started = Instant::now();
    let mut summary = ListingSummary::default();

    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        summary.lines_read += 1;
        trace!(line = summary.lines_read, text = %line, "Received listing line");

        if let Some(entry) = parse_listing_line(&line) {
            summary.total_bytes = summary.total_bytes.saturating_add(entry.size);
            summary.entries.push(entry);
        }
    }

    // Stable sort keeps listing order among equal sizes
    summary.entries.sort_by(|a, b| b.size.cmp(&a.size));
    summary.elapsed = started.elapsed();

    debug!(
        lines = summary.lines_read,
        entries = summary.entries.len(),
        total_bytes = summary.total_bytes,
        "Listing consumed"
    );
    Ok(summary)
}

/// Run `ls -l <dir>` and consume its output through a pipe
///
/// # Errors
///
/// - `BankError::ListingCommand` if the command cannot start or exits unsuccessfully
/// - `BankError::IoError` if reading the pipe fails
pub fn run_listing(dir: &Path) -> Result<ListingSummary, BankError> {
    let label = format!("ls -l {}", dir.display());
    let mut command = Command::new("ls");
    command.arg("-l").arg(dir);

    consume_command(command, &label)
}

/// Spawn `command` and consume its stdout as a listing
///
/// Stderr is drained on its own thread while stdout is read, so a child that
/// fills the stderr pipe cannot stall.
pub(crate) fn consume_command(mut command: Command, label: &str) -> Result<ListingSummary, BankError> {
    info!(command = %label, "Running listing command");

    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| BankError::listing_command(label, &e.to_string()))?;

    let stderr = child.stderr.take();
    let stderr_drain = thread::spawn(move || {
        let mut text = Vec::new();
        if let Some(mut stderr) = stderr {
            if let Err(e) = stderr.read_to_end(&mut text) {
                debug!(error = %e, "Failed to read listing stderr");
            }
        }
        text
    });

    let consumed = match child.stdout.take() {
        Some(stdout) => consume_listing(BufReader::new(stdout)),
        None => Err(BankError::listing_command(label, "stdout was not captured")),
    };

    let status = child
        .wait()
        .map_err(|e| BankError::listing_command(label, &e.to_string()))?;
    let stderr = stderr_drain.join().unwrap_or_default();

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr);
        let message = match stderr.trim() {
            "" => status.to_string(),
            text => format!("{}: {}", status, text),
        };
        return Err(BankError::listing_command(label, &message));
    }

    consumed
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::io::Cursor;

    #[rstest]
    #[case::regular(
        "-rw-r--r-- 1 alice staff 2048 Mar 14 09:12 notes.txt",
        Some(("-rw-r--r--", 2048, "Mar 14 09:12", "notes.txt"))
    )]
    #[case::name_with_spaces(
        "-rw-r--r-- 1 alice staff 10 Jan 2 2023 my report.pdf",
        Some(("-rw-r--r--", 10, "Jan 2 2023", "my report.pdf"))
    )]
    #[case::symlink(
        "lrwxrwxrwx 1 root root 7 Feb 1 10:00 bin -> usr/bin",
        Some(("lrwxrwxrwx", 7, "Feb 1 10:00", "bin -> usr/bin"))
    )]
    #[case::directory("drwxr-xr-x 2 alice staff 4096 Mar 14 09:12 src", None)]
    #[case::total("total 24", None)]
    #[case::too_few_fields("-rw-r--r-- 1 alice staff 2048 Mar 14 09:12", None)]
    #[case::bad_size("-rw-r--r-- 1 alice staff big Mar 14 09:12 a.txt", None)]
    #[case::negative_size("-rw-r--r-- 1 alice staff -5 Mar 14 09:12 a.txt", None)]
    #[case::empty("", None)]
    fn test_parse_listing_line(
        #[case] line: &str,
        #[case] expected: Option<(&str, u64, &str, &str)>,
    ) {
        let parsed = parse_listing_line(line);

        let expected = expected.map(|(permissions, size, timestamp, name)| FileEntry {
            permissions: permissions.to_string(),
            size,
            timestamp: timestamp.to_string(),
            name: name.to_string(),
        });
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_consume_listing_sorts_and_totals() {
        let input = "total 12\n\
            -rw-r--r-- 1 a g 100 Mar 1 10:00 small\n\
            drwxr-xr-x 2 a g 4096 Mar 1 10:00 dir\n\
            -rw-r--r-- 1 a g 900 Mar 1 10:00 big\n\
            garbage line\n\
            -rw-r--r-- 1 a g 100 Mar 1 10:00 small-too\n";

        let summary = consume_listing(Cursor::new(input)).unwrap();

        let names: Vec<&str> = summary.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["big", "small", "small-too"]);
        assert_eq!(summary.total_bytes, 1100);
        assert_eq!(summary.lines_read, 6);
    }

    #[test]
    fn test_consume_empty_listing() {
        let summary = consume_listing(Cursor::new("")).unwrap();

        assert!(summary.entries.is_empty());
        assert_eq!(summary.total_bytes, 0);
        assert_eq!(summary.lines_read, 0);
    }

    #[test]
    fn test_summary_display() {
        let summary = consume_listing(Cursor::new(
            "-rw-r--r-- 1 a g 5 Mar 1 10:00 five\n-rw-r--r-- 1 a g 9 Mar 1 10:00 nine\n",
        ))
        .unwrap();

        let text = summary.to_string();
        assert!(text.starts_with("Processed 2 files in "));
        assert!(text.contains("Total size: 14 bytes\n"));
        assert!(text.ends_with("Files sorted by size:\nnine (9 bytes)\nfive (5 bytes)\n"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_listing_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let result = run_listing(&missing);

        assert!(matches!(result, Err(BankError::ListingCommand { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_consume_command_survives_noisy_stderr() {
        // Far more stderr than a pipe buffer holds, written before any stdout
        let mut command = Command::new("sh");
        command.arg("-c").arg(
            "head -c 1000000 /dev/zero >&2; echo '-rw-r--r-- 1 a g 42 Jan 1 00:00 only.txt'",
        );

        let summary = consume_command(command, "noisy").unwrap();

        assert_eq!(summary.entries.len(), 1);
        assert_eq!(summary.total_bytes, 42);
    }

    #[cfg(unix)]
    #[test]
    fn test_consume_command_reports_stderr_on_failure() {
        let mut command = Command::new("sh");
        command.arg("-c").arg("echo 'cannot list' >&2; exit 3");

        let error = consume_command(command, "failing").unwrap_err();

        assert!(matches!(error, BankError::ListingCommand { .. }));
        assert!(error.to_string().contains("cannot list"));
    }

    proptest! {
        #[test]
        fn prop_parses_generated_lines(
            size in any::<u64>(),
            name in "[a-zA-Z0-9_.-]{1,12}( [a-zA-Z0-9_.-]{1,12}){0,2}",
        ) {
            let line = format!("-rw-r--r-- 1 owner group {} Jun 30 23:59 {}", size, name);

            let entry = parse_listing_line(&line).unwrap();

            prop_assert_eq!(entry.size, size);
            prop_assert_eq!(entry.name, name);
            prop_assert_eq!(entry.timestamp, "Jun 30 23:59");
        }

        #[test]
        fn prop_total_matches_entries(sizes in proptest::collection::vec(0u64..1_000_000, 0..40)) {
            let input: String = sizes
                .iter()
                .enumerate()
                .map(|(i, size)| format!("-rw-r--r-- 1 o g {} Jan 1 00:00 f{}\n", size, i))
                .collect();

            let summary = consume_listing(Cursor::new(input)).unwrap();

            prop_assert_eq!(summary.entries.len(), sizes.len());
            prop_assert_eq!(summary.total_bytes, sizes.iter().sum::<u64>());
            prop_assert!(summary.entries.windows(2).all(|w| w[0].size >= w[1].size));
        }
    }
}
