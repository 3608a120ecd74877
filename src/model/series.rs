use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::compartment::{index, Compartment, N_COMPARTMENTS};

/// Label used for the across-cohort aggregate in tidy output.
pub const TOTAL_LABEL: &str = "total";

/// Day-indexed trajectory. `states[i]` is the full state at `days[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub n_cohorts: usize,
    pub days: Vec<u32>,
    pub states: Vec<Vec<f64>>,
}

/// One row of the long-format table handed to charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyRow {
    pub day: u32,
    pub label: String,
    pub compartment: Compartment,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub peak_infectious_day: u32,
    pub peak_infectious: f64,
    pub final_totals: BTreeMap<Compartment, f64>,
    /// Largest |N_a(t) - N_a(0)| / N_a(0) over all days and cohorts.
    pub max_population_drift: f64,
}

pub fn cohort_label(cohort: usize) -> String {
    format!("cohort_{}", cohort)
}

impl TimeSeries {
    pub fn with_capacity(n_cohorts: usize, n_days: usize) -> Self {
        Self { n_cohorts, days: Vec::with_capacity(n_days), states: Vec::with_capacity(n_days) }
    }

    pub(crate) fn push(&mut self, day: u32, state: Vec<f64>) {
        debug_assert_eq!(state.len(), self.n_cohorts * N_COMPARTMENTS);
        self.days.push(day);
        self.states.push(state);
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn value(&self, day_index: usize, cohort: usize, compartment: Compartment) -> f64 {
        self.states[day_index][index(cohort, compartment)]
    }

    /// S+E+I+M+R+D of one cohort on one day.
    pub fn cohort_total(&self, day_index: usize, cohort: usize) -> f64 {
        let base = cohort * N_COMPARTMENTS;
        self.states[day_index][base..base + N_COMPARTMENTS].iter().sum()
    }

    pub fn cohort_series(&self, cohort: usize, compartment: Compartment) -> Vec<f64> {
        self.states.iter().map(|y| y[index(cohort, compartment)]).collect()
    }

    /// Sum of one compartment over all cohorts, per day.
    pub fn compartment_total(&self, compartment: Compartment) -> Vec<f64> {
        self.states
            .iter()
            .map(|y| (0..self.n_cohorts).map(|a| y[index(a, compartment)]).sum())
            .collect()
    }

    pub fn final_state(&self) -> Option<&[f64]> {
        self.states.last().map(|y| y.as_slice())
    }

    /// Every day x (each cohort, then the aggregate) x every compartment.
    pub fn tidy_rows(&self) -> Vec<TidyRow> {
        let mut rows = Vec::with_capacity(self.len() * (self.n_cohorts + 1) * N_COMPARTMENTS);
        for (day, y) in self.days.iter().zip(&self.states) {
            for a in 0..self.n_cohorts {
                let label = cohort_label(a);
                for c in Compartment::ALL {
                    rows.push(TidyRow { day: *day, label: label.clone(), compartment: c, value: y[index(a, c)] });
                }
            }
            for c in Compartment::ALL {
                let value = (0..self.n_cohorts).map(|a| y[index(a, c)]).sum();
                rows.push(TidyRow { day: *day, label: TOTAL_LABEL.to_string(), compartment: c, value });
            }
        }
        rows
    }

    pub fn summary(&self) -> SimulationSummary {
        let infectious = self.compartment_total(Compartment::Infectious);
        let (peak_idx, peak_infectious) = infectious
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, v)| if v > best.1 { (i, v) } else { best });

        let final_totals = match self.states.last() {
            Some(y) => Compartment::ALL
                .iter()
                .map(|c| (*c, (0..self.n_cohorts).map(|a| y[index(a, *c)]).sum()))
                .collect(),
            None => BTreeMap::new(),
        };

        let mut max_population_drift: f64 = 0.0;
        if !self.is_empty() {
            for a in 0..self.n_cohorts {
                let n0 = self.cohort_total(0, a);
                for d in 0..self.len() {
                    let drift = (self.cohort_total(d, a) - n0).abs() / n0;
                    max_population_drift = max_population_drift.max(drift);
                }
            }
        }

        SimulationSummary {
            peak_infectious_day: self.days.get(peak_idx).copied().unwrap_or(0),
            peak_infectious: if peak_infectious.is_finite() { peak_infectious } else { 0.0 },
            final_totals,
            max_population_drift,
        }
    }
}
