// THEORY:
// The merge engine is the core of the Spatial Grouping Layer. Independent
// segmentation blobs routinely fragment one physical object into several
// nearby rectangles; this module collapses them back into one bounding box
// per object using a "grow until fixed point" clustering pass.
//
// Key architectural principles & algorithm steps:
// 1.  **Used Markers**: Every region carries a "used" flag. The first unused
//     region in scan order seeds a new group and is marked used.
// 2.  **Fixed-Point Growth**: The group's bounding envelope is grown by
//     repeatedly scanning the remaining unused regions and absorbing any that
//     relate to the *current* envelope, until a full scan absorbs nothing.
//     Because each absorption enlarges the envelope, chained proximity
//     (A near B near C, with A and C far apart) collapses within a single
//     frame rather than needing multiple frames to converge.
// 3.  **Join Criteria**: A region joins a group if ANY of the following hold:
//     its center is within `distance_threshold` of the envelope's center; it
//     overlaps the envelope with positive area on both axes; or the
//     axis-aligned gaps to the envelope are below `distance_threshold / 2` on
//     both axes at once (near-touching but not overlapping).
// 4.  **Aggregation & Re-Check**: Each finished group is emitted as one
//     `DetectedObject` whose area is the merged envelope's own width*height.
//     The same minimum-area floor applied to raw regions is re-applied here,
//     discarding groups whose merged envelope still comes out too small.
//
// The scan order is the input order. Which region seeds a group when several
// disjoint clusters exist is therefore implementation-defined, and callers
// must not depend on it; object identity is not preserved across frames.

use crate::core_modules::region::{DetectedObject, Envelope, RawRegion};

/// Clusters the frame's filtered regions into one `DetectedObject` per
/// physical object. Worst case is quadratic in region count per growth pass,
/// which is acceptable at the tens of candidates a frame realistically has.
pub fn merge_regions(
    regions: &[RawRegion],
    distance_threshold: f64,
    min_area: u64,
) -> Vec<DetectedObject> {
    let mut used = vec![false; regions.len()];
    let mut objects = Vec::new();

    for seed in 0..regions.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let mut envelope = Envelope::of(&regions[seed]);

        // Grow until a full scan over the unused regions adds nothing.
        let mut changed = true;
        while changed {
            changed = false;
            for (i, region) in regions.iter().enumerate() {
                if used[i] {
                    continue;
                }
                if should_join(&envelope, region, distance_threshold) {
                    envelope.include(region);
                    used[i] = true;
                    changed = true;
                }
            }
        }

        let object = DetectedObject::from_envelope(&envelope);
        // A merge can still produce a flat or thin envelope; re-apply the
        // minimum object area before emitting.
        if object.area > min_area {
            objects.push(object);
        }
    }

    objects
}

fn should_join(envelope: &Envelope, region: &RawRegion, distance_threshold: f64) -> bool {
    let (group_cx, group_cy) = envelope.center();
    let (region_cx, region_cy) = region.center();
    let distance =
        ((group_cx - region_cx).powi(2) + (group_cy - region_cy).powi(2)).sqrt();
    if distance < distance_threshold {
        return true;
    }
    if envelope.overlaps(region) {
        return true;
    }
    let (x_gap, y_gap) = envelope.gap_to(region);
    let near = distance_threshold / 2.0;
    (x_gap as f64) < near && (y_gap as f64) < near
}
