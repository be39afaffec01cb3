// THEORY:
// The `pipeline` module is the top-level API of the producer side. It wires
// the per-frame stages into a single entry point: filter the raw candidate
// regions, merge what remains into coherent objects, and publish the results
// onto the shared queue. Callers hand in a frame's worth of raw regions and
// get back that frame's detected objects; everything else (throttling,
// stamping, durability) happens behind the publisher.
//
// There is no process-wide state here: configuration and the queue handle are
// explicit fields, constructed once and owned by the pipeline instance.

use crate::core_modules::merge_engine;
use crate::core_modules::publisher::{DEFAULT_MIN_INTERVAL, EventPublisher};
use crate::core_modules::region_filter;
use std::path::PathBuf;
use std::time::Duration;

// Re-export the key data structures for the public API.
pub use crate::core_modules::event::Event;
pub use crate::core_modules::region::{DetectedObject, RawRegion};
pub use crate::core_modules::region_filter::FilterThresholds;

/// Configuration for the detector pipeline, allowing for tunable behavior.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Size and shape thresholds applied to raw regions, and re-applied as
    /// the minimum object area after merging.
    pub thresholds: FilterThresholds,
    /// Maximum center-to-center distance (pixels) at which regions are still
    /// considered one object.
    pub distance_threshold: f64,
    /// The shared queue file appended by this pipeline's publisher.
    pub queue_path: PathBuf,
    /// Floor between successive queue writes.
    pub min_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            thresholds: FilterThresholds::default(),
            distance_threshold: 100.0,
            queue_path: PathBuf::from("position_queue.txt"),
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }
}

/// The producer-side engine: one instance per detector process.
pub struct DetectorPipeline {
    config: PipelineConfig,
    publisher: EventPublisher,
}

impl DetectorPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let publisher = EventPublisher::new(&config.queue_path, config.min_interval);
        Self { config, publisher }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes one frame's raw candidate regions.
    ///
    /// Stage 1 filters implausible rectangles, stage 2 merges the survivors
    /// into one object per cluster, stage 3 publishes each object as a motion
    /// record (subject to the publisher's throttle). Publish failures are
    /// dropped inside the publisher and never surface here.
    pub fn process_frame(&mut self, raw_regions: &[RawRegion]) -> Vec<DetectedObject> {
        let filtered = region_filter::filter_regions(raw_regions, &self.config.thresholds);
        let objects = merge_engine::merge_regions(
            &filtered,
            self.config.distance_threshold,
            self.config.thresholds.min_area,
        );
        for object in &objects {
            self.publisher.publish(Event::motion(object));
        }
        objects
    }

    /// Forwards an externally classified detection (the model path) onto the
    /// queue as a classifier record. Returns whether the record was written.
    pub fn publish_classified(&mut self, object: &DetectedObject, confidence: f64) -> bool {
        self.publisher.publish(Event::cat(object, confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_queue(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "motion_sentry_pipe_{}_{}.txt",
            name,
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        path
    }

    fn config(queue_path: PathBuf) -> PipelineConfig {
        PipelineConfig {
            queue_path,
            min_interval: Duration::ZERO,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn frame_flows_from_regions_to_queue_records() {
        let path = temp_queue("flow");
        let mut pipeline = DetectorPipeline::new(config(path.clone()));

        let objects = pipeline.process_frame(&[
            RawRegion::new(10, 10, 60, 60),
            RawRegion::new(65, 10, 60, 60),
            // Too small for the default filter.
            RawRegion::new(500, 500, 5, 5),
        ]);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].bbox, RawRegion::new(10, 10, 115, 60));

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);
        let event = Event::decode_line(lines[0]).unwrap();
        assert_eq!(event.position(), (67, 40));
        assert_eq!(event.bbox(), [10, 10, 115, 60]);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn classified_detections_publish_as_cat_records() {
        let path = temp_queue("classified");
        let mut pipeline = DetectorPipeline::new(config(path.clone()));

        let objects = pipeline.process_frame(&[RawRegion::new(0, 0, 80, 80)]);
        assert!(pipeline.publish_classified(&objects[0], 0.91));

        let content = fs::read_to_string(&path).unwrap();
        let last = content.lines().last().unwrap();
        assert!(last.contains("\"type\":\"cat\""));
        assert!(last.contains("\"confidence\":0.91"));
        let _ = fs::remove_file(&path);
    }
}
