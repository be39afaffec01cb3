// The detector daemon: the single producer of the position queue.
//
// Camera capture and foreground-mask extraction live in an external
// segmentation process; this binary receives its output as one JSON array of
// candidate rectangles per frame on stdin, runs the filter/merge pipeline,
// and publishes the merged detections. The end of stdin is the natural end
// of the run, not an error.

use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use motion_sentry::pipeline::{DetectorPipeline, FilterThresholds, PipelineConfig, RawRegion};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "motion_tracker",
    about = "Merges per-frame candidate regions into tracked objects and publishes them to the position queue"
)]
struct Args {
    /// Shared queue file written by this process and tailed by consumers.
    #[arg(long, default_value = "position_queue.txt")]
    queue: PathBuf,
    /// Distance (pixels) under which nearby regions merge into one object.
    #[arg(long, default_value_t = 100.0)]
    distance_threshold: f64,
    /// Minimum pixel area for a valid detection, before and after merging.
    #[arg(long, default_value_t = 2000)]
    min_area: u64,
    /// Both sides of a candidate must exceed this many pixels.
    #[arg(long, default_value_t = 30)]
    min_dim: u32,
    /// Lower bound (exclusive) of accepted width/height ratios.
    #[arg(long, default_value_t = 0.2)]
    aspect_low: f64,
    /// Upper bound (exclusive) of accepted width/height ratios.
    #[arg(long, default_value_t = 5.0)]
    aspect_high: f64,
    /// Minimum milliseconds between queue writes.
    #[arg(long, default_value_t = 100)]
    min_interval_ms: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = PipelineConfig {
        thresholds: FilterThresholds {
            min_dim: args.min_dim,
            min_area: args.min_area,
            aspect_bounds: (args.aspect_low, args.aspect_high),
        },
        distance_threshold: args.distance_threshold,
        queue_path: args.queue.clone(),
        min_interval: Duration::from_millis(args.min_interval_ms),
    };
    let mut pipeline = DetectorPipeline::new(config);
    info!("motion tracker started, queue at {}", args.queue.display());

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let regions: Vec<RawRegion> = match serde_json::from_str(&line) {
            Ok(regions) => regions,
            Err(err) => {
                debug!("skipping malformed frame input: {err}");
                continue;
            }
        };

        let objects = pipeline.process_frame(&regions);
        for object in &objects {
            info!(
                "moving object at x={}, y={}, area={}",
                object.center.0, object.center.1, object.area
            );
        }
    }

    // No further frames from the segmentation side: done.
    info!("input stream ended, stopping motion tracker");
    Ok(())
}
