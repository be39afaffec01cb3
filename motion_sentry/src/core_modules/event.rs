// THEORY:
// One queue record = one self-contained JSON line. The record schema is a
// tagged variant on the `type` field with a fixed shape per kind, decoded
// explicitly instead of relying on loosely-typed dictionaries: motion events
// carry the merged envelope's area, classifier events carry the model's
// confidence. Only portable numeric and string primitives appear on the wire,
// so any process with a JSON parser can consume the queue. Decoding tolerates
// unknown extra fields for forward compatibility, and absent optional fields
// default rather than fail.

use crate::core_modules::region::DetectedObject;
use serde::{Deserialize, Serialize};

/// A single persisted queue record.
///
/// `timestamp` is wall-clock seconds since the Unix epoch, assigned by the
/// publisher at write time (not at frame capture). Within one publisher's
/// output it is monotonically non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    /// A merged motion detection from the background-subtraction path.
    Motion {
        x: u32,
        y: u32,
        area: u64,
        #[serde(default)]
        bbox: [u32; 4],
        #[serde(default)]
        timestamp: f64,
    },
    /// A classified detection forwarded from the external model path.
    Cat {
        x: u32,
        y: u32,
        confidence: f64,
        #[serde(default)]
        bbox: [u32; 4],
        #[serde(default)]
        timestamp: f64,
    },
}

impl Event {
    /// Builds an unstamped motion record for a merged object. The publisher
    /// assigns the timestamp when the record is actually written.
    pub fn motion(object: &DetectedObject) -> Self {
        Event::Motion {
            x: object.center.0,
            y: object.center.1,
            area: object.area,
            bbox: bbox_of(object),
            timestamp: 0.0,
        }
    }

    /// Builds an unstamped classifier record for an object with a model
    /// confidence.
    pub fn cat(object: &DetectedObject, confidence: f64) -> Self {
        Event::Cat {
            x: object.center.0,
            y: object.center.1,
            confidence,
            bbox: bbox_of(object),
            timestamp: 0.0,
        }
    }

    pub fn timestamp(&self) -> f64 {
        match self {
            Event::Motion { timestamp, .. } | Event::Cat { timestamp, .. } => *timestamp,
        }
    }

    pub(crate) fn stamp(&mut self, at: f64) {
        match self {
            Event::Motion { timestamp, .. } | Event::Cat { timestamp, .. } => *timestamp = at,
        }
    }

    /// Pixel position of the record, regardless of kind.
    pub fn position(&self) -> (u32, u32) {
        match self {
            Event::Motion { x, y, .. } | Event::Cat { x, y, .. } => (*x, *y),
        }
    }

    pub fn bbox(&self) -> [u32; 4] {
        match self {
            Event::Motion { bbox, .. } | Event::Cat { bbox, .. } => *bbox,
        }
    }

    /// Decodes one queue line. Returns `None` for blank or malformed lines
    /// (torn writes, corrupt encoding, unknown kinds); consumers skip those.
    pub fn decode_line(line: &str) -> Option<Event> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        serde_json::from_str(line).ok()
    }

    /// Encodes the record as one queue line, without the trailing newline.
    pub fn encode_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn bbox_of(object: &DetectedObject) -> [u32; 4] {
    [
        object.bbox.x,
        object.bbox.y,
        object.bbox.width,
        object.bbox.height,
    ]
}
