// THEORY:
// The region filter is the first gate of the pipeline. Segmentation produces
// a noisy, unordered set of candidate rectangles per frame; most of the noise
// is tiny specks or implausibly stretched shapes. This stateless utility
// discards anything whose size or aspect ratio could not belong to a real
// object, so the merge engine only ever works on plausible candidates.
//
// The filter is a pure function of its input and thresholds: no side effects,
// no memory between frames, input order preserved.

use crate::core_modules::region::RawRegion;

/// Size and shape thresholds for plausible candidate regions.
#[derive(Debug, Clone)]
pub struct FilterThresholds {
    /// Both sides of the rectangle must exceed this many pixels.
    pub min_dim: u32,
    /// Minimum pixel area for a valid detection.
    pub min_area: u64,
    /// Open interval of accepted width/height ratios.
    pub aspect_bounds: (f64, f64),
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            min_dim: 30,
            min_area: 2000,
            aspect_bounds: (0.2, 5.0),
        }
    }
}

/// Returns the subsequence of `regions` that passes the size and aspect
/// checks. A region with zero height is excluded outright; its aspect ratio
/// is undefined and never computed.
pub fn filter_regions(regions: &[RawRegion], thresholds: &FilterThresholds) -> Vec<RawRegion> {
    regions
        .iter()
        .copied()
        .filter(|region| passes(region, thresholds))
        .collect()
}

fn passes(region: &RawRegion, thresholds: &FilterThresholds) -> bool {
    if region.height == 0 {
        return false;
    }
    // Edges running off the u32 coordinate space are malformed input, not a
    // plausible object.
    if region.x.checked_add(region.width).is_none()
        || region.y.checked_add(region.height).is_none()
    {
        return false;
    }
    let (low, high) = thresholds.aspect_bounds;
    let aspect = region.width as f64 / region.height as f64;
    region.width > thresholds.min_dim
        && region.height > thresholds.min_dim
        && region.area() > thresholds.min_area
        && aspect > low
        && aspect < high
}
