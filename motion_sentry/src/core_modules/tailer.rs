// THEORY:
// Consumers discover new records without coordinating with the publisher or
// with each other. Two access patterns cover every consumer in the system:
//
// 1.  **Cursor tailing** (`EventTailer`): the consumer privately remembers a
//     byte offset into the queue file. Each poll seeks there, takes every
//     *complete* line appended since, and advances the offset past them. A
//     torn tail (a record still being appended) stays unread until its
//     newline lands, so a line is never returned twice and never returned
//     half-written. If the file is suddenly shorter than the offset, the
//     queue was cleared externally; the cursor resets to zero and everything
//     currently in the file counts as unread.
// 2.  **Bounded-window scan** (`RecentWindow`): for consumers that only need
//     "is anything happening right now," read at most the last N lines, parse
//     newest-first, and stop at the first record older than the freshness
//     window. Records are time-ordered by the publisher, so the early exit is
//     exact, not an approximation.
//
// Malformed lines are skipped, a missing file is an empty queue, and nothing
// in here can abort a consumer.

use crate::core_modules::event::Event;
use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default line window for bounded scans of the queue tail.
pub const DEFAULT_SCAN_LINES: usize = 100;

/// A per-consumer read cursor over the shared position queue. Exclusively
/// owned by its consumer; never shared between processes.
pub struct EventTailer {
    path: PathBuf,
    offset: u64,
}

impl EventTailer {
    /// Starts at offset zero: all existing content counts as unread.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
        }
    }

    /// Starts at the current end of file, for "only new events" semantics.
    /// A missing file behaves like an empty one.
    pub fn from_end(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let offset = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        Self { path, offset }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns every complete record appended since the last poll, in file
    /// order, advancing the cursor past them. Never returns a record twice.
    pub fn poll(&mut self) -> Vec<Event> {
        let Ok(mut file) = File::open(&self.path) else {
            // Missing file is an empty queue, not an error.
            return Vec::new();
        };
        let Ok(len) = file.metadata().map(|m| m.len()) else {
            return Vec::new();
        };
        if len < self.offset {
            // Externally truncated: everything present is unread again.
            self.offset = 0;
        }
        if len == self.offset {
            return Vec::new();
        }
        if file.seek(SeekFrom::Start(self.offset)).is_err() {
            return Vec::new();
        }
        let mut buf = Vec::new();
        if file.read_to_end(&mut buf).is_err() {
            return Vec::new();
        }

        // Consume only up to the last newline; a torn tail waits for the
        // next poll.
        let Some(end) = buf.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };
        let complete = &buf[..=end];
        self.offset += complete.len() as u64;

        let mut events = Vec::new();
        for line in String::from_utf8_lossy(complete).lines() {
            if line.trim().is_empty() {
                continue;
            }
            match Event::decode_line(line) {
                Some(event) => events.push(event),
                None => debug!("skipping malformed queue line"),
            }
        }
        events
    }
}

/// A fixed window over the newest queue records, filtered by freshness.
/// Stateless between polls; holds no cursor.
pub struct RecentWindow {
    path: PathBuf,
    max_lines: usize,
    freshness: Duration,
}

impl RecentWindow {
    pub fn new(path: impl Into<PathBuf>, max_lines: usize, freshness: Duration) -> Self {
        Self {
            path: path.into(),
            max_lines,
            freshness,
        }
    }

    /// Returns the still-fresh records, newest first, judged against the
    /// current wall clock.
    pub fn poll(&self) -> Vec<Event> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        self.poll_at(now)
    }

    /// Like `poll`, with freshness judged against the supplied wall-clock
    /// seconds. Lets a consumer reuse one clock read across a tick.
    pub fn poll_at(&self, now: f64) -> Vec<Event> {
        let Ok(bytes) = fs::read(&self.path) else {
            return Vec::new();
        };
        // Lossy decoding keeps the scan alive across corrupt bytes; the
        // affected lines simply fail to parse and are skipped below.
        let content = String::from_utf8_lossy(&bytes);
        let lines: Vec<&str> = content.lines().collect();
        let start = lines.len().saturating_sub(self.max_lines);
        let horizon = self.freshness.as_secs_f64();

        let mut fresh = Vec::new();
        for line in lines[start..].iter().rev() {
            let Some(event) = Event::decode_line(line) else {
                // Malformed lines carry no timestamp to judge; skip them
                // without ending the scan.
                continue;
            };
            if now - event.timestamp() <= horizon {
                fresh.push(event);
            } else {
                // Older records only get older further back.
                break;
            }
        }
        fresh
    }
}

/// Truncates the queue to empty: the explicit, out-of-band "clear" command.
/// Safe to run while consumers are polling; their cursors observe the
/// shortened file and reset to zero on their next poll.
pub fn clear(path: impl AsRef<Path>) -> std::io::Result<()> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    Ok(())
}
