// THEORY:
// This module holds the "dumb" data containers for the spatial side of the
// pipeline. A `RawRegion` is a single candidate rectangle handed to us by the
// external segmentation step; it lives only long enough to be filtered and
// merged. An `Envelope` is the running bounding box of a merge group while it
// grows. A `DetectedObject` is the immutable per-frame output of the merge
// engine: one rectangle, one center, one area per physical object.
//
// None of these types carry behavior beyond simple geometry. All clustering
// logic lives in `merge_engine`, keeping these containers reusable by the
// filter, the merge engine, and the event codec alike.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle candidate for "something moved here," in pixel
/// coordinates. Produced by the external segmentation step, one per contour,
/// and discarded after filtering and merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RawRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Pixel area of the rectangle.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Exclusive right edge (x + width), saturating at the edge of the
    /// coordinate space so degenerate input cannot overflow.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge (y + height), saturating like `right`.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Geometric center of the rectangle.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }
}

/// The running bounding envelope of a merge group: the tightest axis-aligned
/// rectangle covering every member region added so far. Transient; exists
/// only during one merge pass and is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub min_x: u32,
    pub min_y: u32,
    /// Exclusive right edge.
    pub max_x: u32,
    /// Exclusive bottom edge.
    pub max_y: u32,
}

impl Envelope {
    /// Starts an envelope covering exactly one region.
    pub fn of(region: &RawRegion) -> Self {
        Self {
            min_x: region.x,
            min_y: region.y,
            max_x: region.right(),
            max_y: region.bottom(),
        }
    }

    /// Expands the envelope to also cover `region`.
    pub fn include(&mut self, region: &RawRegion) {
        self.min_x = self.min_x.min(region.x);
        self.min_y = self.min_y.min(region.y);
        self.max_x = self.max_x.max(region.right());
        self.max_y = self.max_y.max(region.bottom());
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x as u64 + self.max_x as u64) as f64 / 2.0,
            (self.min_y as u64 + self.max_y as u64) as f64 / 2.0,
        )
    }

    /// True when the region and the envelope share positive intersection
    /// area on both axes.
    pub fn overlaps(&self, region: &RawRegion) -> bool {
        let overlap_x = self.max_x.min(region.right()) as i64 - self.min_x.max(region.x) as i64;
        let overlap_y = self.max_y.min(region.bottom()) as i64 - self.min_y.max(region.y) as i64;
        overlap_x > 0 && overlap_y > 0
    }

    /// Axis-aligned gaps between the envelope and a region, per axis. Zero on
    /// any axis where the projections touch or overlap.
    pub fn gap_to(&self, region: &RawRegion) -> (u32, u32) {
        let x_gap = self
            .min_x
            .max(region.x)
            .saturating_sub(self.max_x.min(region.right()));
        let y_gap = self
            .min_y
            .max(region.y)
            .saturating_sub(self.max_y.min(region.bottom()));
        (x_gap, y_gap)
    }

    pub fn to_region(&self) -> RawRegion {
        RawRegion {
            x: self.min_x,
            y: self.min_y,
            width: self.max_x - self.min_x,
            height: self.max_y - self.min_y,
        }
    }
}

/// The merge engine's output: one spatially coherent object for the current
/// frame. Immutable after creation; object identity is not preserved across
/// frames by this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedObject {
    /// The merged bounding envelope as an (x, y, w, h) rectangle.
    pub bbox: RawRegion,
    /// Integer center of the merged envelope, in pixel coordinates.
    pub center: (u32, u32),
    /// Area of the merged envelope (width * height), not the sum of the
    /// member regions' areas.
    pub area: u64,
}

impl DetectedObject {
    pub fn from_envelope(envelope: &Envelope) -> Self {
        let bbox = envelope.to_region();
        Self {
            center: (bbox.x + bbox.width / 2, bbox.y + bbox.height / 2),
            area: bbox.area(),
            bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_grows_to_cover_members() {
        let mut envelope = Envelope::of(&RawRegion::new(10, 10, 40, 40));
        envelope.include(&RawRegion::new(45, 5, 40, 40));
        assert_eq!(envelope.to_region(), RawRegion::new(10, 5, 75, 45));
    }

    #[test]
    fn overlap_requires_positive_area_on_both_axes() {
        let envelope = Envelope::of(&RawRegion::new(0, 0, 10, 10));
        // Shares an edge, not an area.
        assert!(!envelope.overlaps(&RawRegion::new(10, 0, 10, 10)));
        assert!(envelope.overlaps(&RawRegion::new(9, 9, 10, 10)));
    }

    #[test]
    fn gaps_are_zero_when_touching() {
        let envelope = Envelope::of(&RawRegion::new(0, 0, 10, 10));
        assert_eq!(envelope.gap_to(&RawRegion::new(10, 0, 10, 10)), (0, 0));
        assert_eq!(envelope.gap_to(&RawRegion::new(25, 40, 10, 10)), (15, 30));
    }

    #[test]
    fn extreme_coordinates_saturate_instead_of_overflowing() {
        let region = RawRegion::new(u32::MAX - 5, u32::MAX - 5, 4000, 4000);
        assert_eq!(region.right(), u32::MAX);
        assert_eq!(region.bottom(), u32::MAX);

        let envelope = Envelope::of(&region);
        let (cx, cy) = envelope.center();
        assert!(cx.is_finite() && cy.is_finite());
        assert_eq!(envelope.to_region().width, 5);
    }

    #[test]
    fn detected_object_uses_envelope_area() {
        let mut envelope = Envelope::of(&RawRegion::new(0, 0, 10, 10));
        envelope.include(&RawRegion::new(90, 0, 10, 10));
        let object = DetectedObject::from_envelope(&envelope);
        assert_eq!(object.area, 1000);
        assert_eq!(object.center, (50, 5));
    }
}
