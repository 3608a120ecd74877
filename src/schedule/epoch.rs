use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_config, Result};
use crate::schedule::interval::NamedInterval;

/// Maximal day span `[start, end)` with a constant set of active interventions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    pub start: u32,
    pub end: u32,
    pub active: BTreeSet<String>,
}

impl Epoch {
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn is_baseline(&self) -> bool {
        self.active.is_empty()
    }
}

/// Sorted distinct day breakpoints: 0, the horizon, and every interval bound.
/// Intervals are assumed range-checked.
pub fn breakpoints(intervals: &[NamedInterval], horizon: u32) -> Vec<u32> {
    let mut points: BTreeSet<u32> = BTreeSet::new();
    points.insert(0);
    points.insert(horizon);
    for iv in intervals {
        points.insert(iv.lo as u32);
        points.insert(iv.hi as u32);
    }
    points.into_iter().collect()
}

/// Partition `[0, horizon)` by the active label set, merging neighbouring
/// spans whose sets are equal. Empty intervals activate nothing, so no
/// zero-length epoch is ever produced.
pub fn build_epochs(intervals: &[NamedInterval], horizon: u32) -> Vec<Epoch> {
    let points = breakpoints(intervals, horizon);
    let mut epochs: Vec<Epoch> = Vec::new();

    for w in points.windows(2) {
        let (start, end) = (w[0], w[1]);
        let active: BTreeSet<String> = intervals
            .iter()
            .filter(|iv| !iv.is_empty() && iv.contains_day(start as i64))
            .map(|iv| iv.label.clone())
            .collect();

        match epochs.last_mut() {
            Some(prev) if prev.active == active => prev.end = end,
            _ => epochs.push(Epoch { start, end, active }),
        }
    }
    epochs
}

/// Epochs must start at 0, end at `horizon`, be non-empty and leave no gap or
/// overlap between neighbours.
pub fn validate_tiling(epochs: &[Epoch], horizon: u32) -> Result<()> {
    ensure_config!(!epochs.is_empty(), "epoch list is empty, expected to cover [0, {})", horizon);
    ensure_config!(epochs[0].start == 0, "first epoch starts at day {}, expected 0", epochs[0].start);
    for (i, e) in epochs.iter().enumerate() {
        ensure_config!(e.start < e.end, "epoch {} [{}, {}) is empty", i, e.start, e.end);
    }
    for (i, w) in epochs.windows(2).enumerate() {
        ensure_config!(
            w[0].end == w[1].start,
            "epochs {} and {} do not meet: [{}, {}) then [{}, {})",
            i, i + 1, w[0].start, w[0].end, w[1].start, w[1].end
        );
    }
    let last = epochs.len() - 1;
    ensure_config!(epochs[last].end == horizon, "last epoch ends at day {}, expected {}", epochs[last].end, horizon);
    Ok(())
}

/// Fixed-width text table, one epoch per line.
pub fn render_epoch_table(epochs: &[Epoch]) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "{:>5} {:>5} {:>5}  active", "start", "end", "days");
    for e in epochs {
        let active = if e.active.is_empty() {
            "-".to_string()
        } else {
            e.active.iter().cloned().collect::<Vec<_>>().join(",")
        };
        let _ = writeln!(s, "{:>5} {:>5} {:>5}  {}", e.start, e.end, e.len(), active);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(label: &str, lo: i64, hi: i64) -> NamedInterval {
        NamedInterval::new(label, lo, hi)
    }

    fn labels(e: &Epoch) -> Vec<&str> {
        e.active.iter().map(|s| s.as_str()).collect()
    }

    #[test]
    fn no_intervals_is_one_baseline_epoch() {
        let epochs = build_epochs(&[], 50);
        assert_eq!(epochs.len(), 1);
        assert_eq!((epochs[0].start, epochs[0].end), (0, 50));
        assert!(epochs[0].is_baseline());
    }

    #[test]
    fn overlapping_intervals_partition_the_axis() {
        let epochs = build_epochs(&[iv("A", 10, 30), iv("B", 20, 40)], 50);
        let spans: Vec<(u32, u32, Vec<&str>)> = epochs.iter().map(|e| (e.start, e.end, labels(e))).collect();
        assert_eq!(
            spans,
            vec![
                (0, 10, vec![]),
                (10, 20, vec!["A"]),
                (20, 30, vec!["A", "B"]),
                (30, 40, vec!["B"]),
                (40, 50, vec![]),
            ]
        );
        validate_tiling(&epochs, 50).unwrap();
    }

    #[test]
    fn adjacent_same_label_pieces_merge() {
        let epochs = build_epochs(&[iv("A", 10, 20), iv("A", 20, 30)], 30);
        assert_eq!(epochs.len(), 2);
        assert_eq!((epochs[1].start, epochs[1].end), (10, 30));
    }

    #[test]
    fn degenerate_interval_adds_no_epoch() {
        let with = build_epochs(&[iv("A", 10, 30), iv("B", 20, 20)], 40);
        let without = build_epochs(&[iv("A", 10, 30)], 40);
        assert_eq!(with, without);
        assert!(with.iter().all(|e| !e.is_empty()));
    }

    #[test]
    fn interval_reaching_horizon() {
        let epochs = build_epochs(&[iv("A", 10, 40)], 40);
        assert_eq!(epochs.len(), 2);
        assert_eq!(epochs[1].end, 40);
        validate_tiling(&epochs, 40).unwrap();
    }

    #[test]
    fn tiling_detects_gap_overlap_and_short_cover() {
        let e = |start, end| Epoch { start, end, active: BTreeSet::new() };
        assert!(validate_tiling(&[e(0, 10), e(11, 20)], 20).is_err());
        assert!(validate_tiling(&[e(0, 10), e(9, 20)], 20).is_err());
        assert!(validate_tiling(&[e(0, 10), e(10, 19)], 20).is_err());
        assert!(validate_tiling(&[e(1, 20)], 20).is_err());
        assert!(validate_tiling(&[e(0, 10), e(10, 10), e(10, 20)], 20).is_err());
        assert!(validate_tiling(&[], 20).is_err());
        assert!(validate_tiling(&[e(0, 10), e(10, 20)], 20).is_ok());
    }
}
