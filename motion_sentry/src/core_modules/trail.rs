// THEORY:
// The trail is the consumer-side smoothing aid: a short, bounded history of
// the most recent accepted positions, independent of raw event volume. New
// positions append, the oldest entry is evicted at capacity, and consumers
// weight entries linearly by position-in-history so the newest reads
// strongest (brighter marker, firmer aim). The trail has no authority over
// detection correctness; it exists purely for presentation and control.

use std::collections::VecDeque;

/// One accepted position with the wall-clock time it was taken on board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailEntry {
    pub x: u32,
    pub y: u32,
    pub recorded_at: f64,
}

/// A fixed-capacity, arrival-ordered window of recent positions.
#[derive(Debug, Clone)]
pub struct Trail {
    entries: VecDeque<TrailEntry>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a position, evicting the oldest entry once at capacity.
    pub fn push(&mut self, x: u32, y: u32, recorded_at: f64) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(TrailEntry { x, y, recorded_at });
    }

    /// The most recently accepted position, if any.
    pub fn latest(&self) -> Option<&TrailEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries oldest first, each paired with a recency weight interpolated
    /// linearly over (0, 1]; the newest entry always weighs 1.0.
    pub fn weighted(&self) -> impl Iterator<Item = (f64, &TrailEntry)> {
        let len = self.entries.len();
        self.entries
            .iter()
            .enumerate()
            .map(move |(i, entry)| ((i + 1) as f64 / len as f64, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_evicts_oldest_first() {
        let mut trail = Trail::new(3);
        for i in 0..5u32 {
            trail.push(i, i, i as f64);
        }
        assert_eq!(trail.len(), 3);
        let xs: Vec<u32> = trail.weighted().map(|(_, e)| e.x).collect();
        assert_eq!(xs, vec![2, 3, 4]);
        assert_eq!(trail.latest().unwrap().x, 4);
    }

    #[test]
    fn weights_rise_linearly_to_one() {
        let mut trail = Trail::new(4);
        for i in 0..4u32 {
            trail.push(i, 0, 0.0);
        }
        let weights: Vec<f64> = trail.weighted().map(|(w, _)| w).collect();
        assert_eq!(weights, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut trail = Trail::new(0);
        trail.push(1, 1, 0.0);
        trail.push(2, 2, 0.0);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.latest().unwrap().x, 2);
    }

    #[test]
    fn clear_empties_the_window() {
        let mut trail = Trail::new(3);
        trail.push(1, 1, 0.0);
        trail.clear();
        assert!(trail.is_empty());
        assert!(trail.latest().is_none());
    }
}
