use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// A labelled day window. Bounds arrive as integers `lo <= hi` and are read as
/// the half-open range `[lo, hi)`, so `lo == hi` is an empty window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedInterval {
    pub label: String,
    pub lo: i64,
    pub hi: i64,
}

impl NamedInterval {
    pub fn new(label: impl Into<String>, lo: i64, hi: i64) -> Self {
        Self { label: label.into(), lo, hi }
    }

    pub fn is_empty(&self) -> bool {
        self.hi <= self.lo
    }

    pub fn len(&self) -> i64 {
        (self.hi - self.lo).max(0)
    }

    pub fn contains_day(&self, day: i64) -> bool {
        self.lo <= day && day < self.hi
    }

    /// `0 <= lo <= hi <= horizon` and `lo < horizon`.
    pub fn check_range(&self, horizon: u32) -> Result<()> {
        let t = horizon as i64;
        if self.lo < 0 || self.lo > self.hi || self.hi > t || self.lo >= t {
            return Err(SimError::InputRange { label: self.label.clone(), lo: self.lo, hi: self.hi, horizon });
        }
        Ok(())
    }

    /// Parts of `self` outside `cut`, left to right, each keeping `self`'s
    /// label. Zero, one or two pieces.
    pub fn minus(&self, cut: &NamedInterval) -> Vec<NamedInterval> {
        if self.is_empty() {
            return vec![self.clone()];
        }
        if cut.is_empty() || cut.hi <= self.lo || self.hi <= cut.lo {
            return vec![self.clone()];
        }
        let mut pieces = Vec::with_capacity(2);
        if self.lo < cut.lo {
            pieces.push(NamedInterval::new(self.label.clone(), self.lo, cut.lo));
        }
        if cut.hi < self.hi {
            pieces.push(NamedInterval::new(self.label.clone(), cut.hi, self.hi));
        }
        pieces
    }
}

/// Remove the override window from every interval and append the override
/// itself as the final entry. Caller order is kept; a split interval yields
/// its earlier piece first.
pub fn excise_override(intervals: &[NamedInterval], override_interval: &NamedInterval) -> Vec<NamedInterval> {
    let mut out: Vec<NamedInterval> = intervals.iter().flat_map(|iv| iv.minus(override_interval)).collect();
    out.push(override_interval.clone());
    out
}
