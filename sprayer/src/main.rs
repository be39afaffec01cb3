// The actuator consumer. It tails the position queue with its own private
// cursor, applies a freshness window, and logs a fire decision for each
// sufficiently large, sufficiently recent detection. Driving the physical
// sprayer hardware is an external concern; this process owns only the
// decision.
//
// By default the stale backlog is cleared at startup so an old queue cannot
// trigger the hardware on boot.

use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use motion_sentry::core_modules::event::Event;
use motion_sentry::core_modules::tailer::{self, EventTailer};
use motion_sentry::core_modules::trail::Trail;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time;

const TRAIL_CAPACITY: usize = 10;

#[derive(Parser, Debug)]
#[command(
    name = "sprayer",
    about = "Tails the position queue and decides when to actuate"
)]
struct Args {
    /// Shared queue file written by the detector.
    #[arg(long, default_value = "position_queue.txt")]
    queue: PathBuf,
    /// Queue poll cadence in milliseconds.
    #[arg(long, default_value_t = 50)]
    poll_ms: u64,
    /// Ignore records older than this many milliseconds at poll time.
    #[arg(long, default_value_t = 500)]
    freshness_ms: u64,
    /// Smallest merged area worth actuating on.
    #[arg(long, default_value_t = 2000)]
    fire_area: u64,
    /// Keep the existing queue backlog instead of clearing it at startup.
    #[arg(long)]
    keep_backlog: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if !args.keep_backlog {
        tailer::clear(&args.queue)?;
        info!("cleared stale queue at {}", args.queue.display());
    }

    let mut cursor = EventTailer::new(&args.queue);
    let mut trail = Trail::new(TRAIL_CAPACITY);
    let freshness = args.freshness_ms as f64 / 1000.0;
    let mut ticker = time::interval(Duration::from_millis(args.poll_ms));

    info!("sprayer watching {}", args.queue.display());
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs_f64())
                    .unwrap_or_default();
                for event in cursor.poll() {
                    if now - event.timestamp() > freshness {
                        debug!("ignoring stale record at {:?}", event.position());
                        continue;
                    }
                    match event {
                        Event::Motion { x, y, area, timestamp, .. } => {
                            trail.push(x, y, timestamp);
                            if area > args.fire_area {
                                info!("firing at x={x}, y={y} (area {area})");
                            }
                        }
                        Event::Cat { x, y, confidence, timestamp, .. } => {
                            trail.push(x, y, timestamp);
                            info!("firing at x={x}, y={y} (cat, confidence {confidence:.2})");
                        }
                    }
                }
                if let Some(aim) = trail.latest() {
                    debug!("current aim point ({}, {})", aim.x, aim.y);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("stopping sprayer");
                break;
            }
        }
    }
    Ok(())
}
