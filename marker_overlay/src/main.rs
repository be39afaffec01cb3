// The display consumer. It only needs "what is happening right now," so it
// uses the bounded-window scan rather than a cursor: each tick reads at most
// the last N queue lines, keeps the still-fresh records, and feeds the
// newest position into a recency trail. The weighted trail is what an overlay
// renderer draws (bigger, brighter markers for newer entries); the drawing
// itself is outside this process's scope, so the selection is logged.
//
// `marker_overlay clear` truncates the shared queue, the out-of-band clear
// command the detector and other consumers tolerate mid-run.

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{debug, info};
use motion_sentry::core_modules::event::Event;
use motion_sentry::core_modules::tailer::{self, RecentWindow};
use motion_sentry::core_modules::trail::Trail;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time;

#[derive(Parser, Debug)]
#[command(
    name = "marker_overlay",
    about = "Selects fresh queue positions and maintains the overlay trail"
)]
struct Args {
    /// Shared queue file written by the detector.
    #[arg(long, default_value = "position_queue.txt")]
    queue: PathBuf,
    /// Poll cadence in milliseconds.
    #[arg(long, default_value_t = 30)]
    poll_ms: u64,
    /// Maximum record age in milliseconds to still draw a marker.
    #[arg(long, default_value_t = 500)]
    freshness_ms: u64,
    /// How many queue lines the bounded scan reads per poll at most.
    #[arg(long, default_value_t = tailer::DEFAULT_SCAN_LINES)]
    scan_lines: usize,
    /// Trail length in positions.
    #[arg(long, default_value_t = 10)]
    trail_len: usize,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Truncate the shared queue and exit.
    Clear,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(Command::Clear) = args.command {
        tailer::clear(&args.queue)?;
        info!("queue cleared at {}", args.queue.display());
        return Ok(());
    }

    let window = RecentWindow::new(
        &args.queue,
        args.scan_lines,
        Duration::from_millis(args.freshness_ms),
    );
    let mut trail = Trail::new(args.trail_len);
    let mut ticker = time::interval(Duration::from_millis(args.poll_ms));

    info!("marker overlay watching {}", args.queue.display());
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs_f64())
                    .unwrap_or_default();
                let positions = window.poll_at(now);

                // Newest first: the head of the scan is the freshest position.
                if let Some(latest) = positions.first() {
                    let (x, y) = latest.position();
                    trail.push(x, y, latest.timestamp());
                    info!("position ({x}, {y}), recent detections: {}", positions.len());
                }

                for (weight, entry) in trail.weighted() {
                    debug!(
                        "trail marker ({}, {}) weight {weight:.2}",
                        entry.x, entry.y
                    );
                }
                for event in &positions {
                    if let Event::Motion { area, bbox, .. } = event {
                        debug!("box {bbox:?} area {area}");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("stopping marker overlay");
                break;
            }
        }
    }
    Ok(())
}
