// THEORY:
// The publisher is the single writer of the shared position queue. It turns
// each frame's accepted objects into durable records visible to other
// processes without a broker, shared memory, or locks: one JSON line per
// record, appended to a plain file. Appends of this size are atomic in
// practice, which is the entire cross-process contract.
//
// Two invariants live here:
// 1.  **Throttling**: writes are rate-limited. While less than `min_interval`
//     has elapsed since the last successful write, `publish` skips, however
//     many objects the frames in between produced. Whatever is published when
//     the throttle reopens is by construction the most recent detection.
// 2.  **Monotonic stamps**: each record is stamped with the wall clock at the
//     moment of writing, clamped to never run backwards across successive
//     records even if the system clock steps.
//
// A failed write is logged and dropped; the producer never dies over queue
// I/O. The log only ever grows, except for the explicit wholesale clear in
// `tailer::clear`.

use crate::core_modules::event::Event;
use log::warn;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Default floor between successive queue writes.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Rate-limited, append-only writer for the shared position queue.
pub struct EventPublisher {
    path: PathBuf,
    min_interval: Duration,
    last_write: Option<Instant>,
    last_timestamp: f64,
}

impl EventPublisher {
    pub fn new(path: impl Into<PathBuf>, min_interval: Duration) -> Self {
        Self {
            path: path.into(),
            min_interval,
            last_write: None,
            last_timestamp: 0.0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stamps and appends one record. Returns `true` when the record was
    /// written, `false` when the throttle skipped it or the write failed.
    /// Never fatal: I/O errors are logged and the event is dropped.
    pub fn publish(&mut self, mut event: Event) -> bool {
        if let Some(last) = self.last_write {
            if last.elapsed() < self.min_interval {
                return false;
            }
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(self.last_timestamp);
        let stamp = now.max(self.last_timestamp);
        event.stamp(stamp);

        match self.append_line(&event) {
            Ok(()) => {
                self.last_write = Some(Instant::now());
                self.last_timestamp = stamp;
                true
            }
            Err(err) => {
                warn!("dropping event, queue write failed: {err}");
                false
            }
        }
    }

    fn append_line(&self, event: &Event) -> std::io::Result<()> {
        let mut line = event
            .encode_line()
            .map_err(std::io::Error::other)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        // One write call per record, so concurrent readers only ever observe
        // whole lines or a torn tail they will pick up next poll.
        file.write_all(line.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::region::{DetectedObject, Envelope, RawRegion};
    use std::fs;

    fn temp_queue(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("motion_sentry_pub_{}_{}.txt", name, std::process::id()));
        let _ = fs::remove_file(&path);
        path
    }

    fn object() -> DetectedObject {
        DetectedObject::from_envelope(&Envelope::of(&RawRegion::new(10, 10, 50, 50)))
    }

    fn lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn writes_one_stamped_line_per_publish() {
        let path = temp_queue("writes");
        let mut publisher = EventPublisher::new(&path, Duration::ZERO);
        assert!(publisher.publish(Event::motion(&object())));

        let written = lines(&path);
        assert_eq!(written.len(), 1);
        let event = Event::decode_line(&written[0]).unwrap();
        assert!(event.timestamp() > 0.0);
        assert_eq!(event.position(), (35, 35));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn throttle_skips_publishes_inside_the_interval() {
        let path = temp_queue("throttle");
        let mut publisher = EventPublisher::new(&path, Duration::from_secs(60));
        assert!(publisher.publish(Event::motion(&object())));
        assert!(!publisher.publish(Event::motion(&object())));
        assert!(!publisher.publish(Event::cat(&object(), 0.9)));
        assert_eq!(lines(&path).len(), 1);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn throttle_reopens_after_the_interval() {
        let path = temp_queue("reopen");
        let mut publisher = EventPublisher::new(&path, Duration::from_millis(20));
        assert!(publisher.publish(Event::motion(&object())));
        assert!(!publisher.publish(Event::motion(&object())));
        std::thread::sleep(Duration::from_millis(30));
        assert!(publisher.publish(Event::motion(&object())));
        assert_eq!(lines(&path).len(), 2);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn timestamps_never_decrease() {
        let path = temp_queue("monotonic");
        let mut publisher = EventPublisher::new(&path, Duration::ZERO);
        for _ in 0..20 {
            assert!(publisher.publish(Event::motion(&object())));
        }
        let stamps: Vec<f64> = lines(&path)
            .iter()
            .map(|l| Event::decode_line(l).unwrap().timestamp())
            .collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn write_failure_is_dropped_not_fatal() {
        // A directory path cannot be opened for appending.
        let mut publisher = EventPublisher::new(std::env::temp_dir(), Duration::ZERO);
        assert!(!publisher.publish(Event::motion(&object())));
        // The publisher stays usable for the next attempt.
        assert!(!publisher.publish(Event::motion(&object())));
    }
}
