//! Intervention scheduling: named, possibly overlapping day windows plus one
//! override window become an ordered list of epochs over `[0, horizon)`.

pub mod epoch;
pub mod interval;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ensure_config, Result};

pub use epoch::{breakpoints, build_epochs, render_epoch_table, validate_tiling, Epoch};
pub use interval::{excise_override, NamedInterval};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub horizon: u32,
    /// Intervals after the override was cut out, override last.
    pub intervals: Vec<NamedInterval>,
    pub epochs: Vec<Epoch>,
}

impl Schedule {
    /// Range-check every interval (override included), excise the override
    /// window and partition the horizon into epochs.
    pub fn build(intervals: &[NamedInterval], override_interval: &NamedInterval, horizon: u32) -> Result<Self> {
        ensure_config!(horizon > 0, "horizon must be at least one day");
        for iv in intervals.iter().chain(std::iter::once(override_interval)) {
            iv.check_range(horizon)?;
        }

        let intervals = excise_override(intervals, override_interval);
        let epochs = build_epochs(&intervals, horizon);
        validate_tiling(&epochs, horizon)?;

        debug!(
            horizon,
            n_intervals = intervals.len(),
            n_epochs = epochs.len(),
            "built intervention schedule"
        );
        Ok(Self { horizon, intervals, epochs })
    }

    /// Every label active in at least one epoch.
    pub fn active_labels(&self) -> BTreeSet<String> {
        self.epochs.iter().flat_map(|e| e.active.iter().cloned()).collect()
    }

    pub fn render(&self) -> String {
        render_epoch_table(&self.epochs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    #[test]
    fn override_strictly_inside_interval() {
        let s = Schedule::build(&[NamedInterval::new("A", 30, 100)], &NamedInterval::new("sip", 40, 60), 120).unwrap();
        assert_eq!(
            s.intervals,
            vec![NamedInterval::new("A", 30, 40), NamedInterval::new("A", 60, 100), NamedInterval::new("sip", 40, 60)]
        );
        let spans: Vec<(u32, u32, Vec<String>)> =
            s.epochs.iter().map(|e| (e.start, e.end, e.active.iter().cloned().collect())).collect();
        assert_eq!(
            spans,
            vec![
                (0, 30, vec![]),
                (30, 40, vec!["A".to_string()]),
                (40, 60, vec!["sip".to_string()]),
                (60, 100, vec!["A".to_string()]),
                (100, 120, vec![]),
            ]
        );
    }

    #[test]
    fn out_of_range_override_fails() {
        let err = Schedule::build(&[], &NamedInterval::new("sip", 40, 160), 120).unwrap_err();
        assert!(matches!(err, SimError::InputRange { .. }));
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let err = Schedule::build(&[], &NamedInterval::new("sip", 0, 0), 0).unwrap_err();
        assert!(matches!(err, SimError::Configuration(_)));
    }
}
