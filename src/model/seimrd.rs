use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ensure_config, Result, SimError};
use crate::math::ode::Rk4;
use crate::model::compartment::{index, Compartment, N_COMPARTMENTS};
use crate::model::contact::ContactMatrix;
use crate::model::series::TimeSeries;
use crate::schedule::{validate_tiling, Epoch};

/// Rates are per day and constant across a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseParams {
    pub beta: f64,  // transmission probability per contact
    pub alpha: f64, // 1/incubation mean
    pub gamma: f64, // 1/infectious mean
    pub delta: f64, // 1/time-to-outcome for severe cases
    /// Severe (fatal) fraction per cohort, each in [0, 1].
    pub kappa: Vec<f64>,
}

impl DiseaseParams {
    pub fn check(&self, n_cohorts: usize) -> Result<()> {
        for (name, v) in [("beta", self.beta), ("alpha", self.alpha), ("gamma", self.gamma), ("delta", self.delta)] {
            ensure_config!(v.is_finite() && v >= 0.0, "{} must be finite and >= 0, got {}", name, v);
        }
        ensure_config!(self.kappa.len() == n_cohorts, "kappa has {} entries, expected {}", self.kappa.len(), n_cohorts);
        for (a, k) in self.kappa.iter().enumerate() {
            ensure_config!((0.0..=1.0).contains(k), "kappa[{}] = {} must lie in [0, 1]", a, k);
        }
        Ok(())
    }
}

/// Fixed-step RK4 settings. `dt = 1 / substeps_per_day`; with the defaults a
/// day is four steps of 0.25.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub substeps_per_day: u32,
    /// Upper bound on RK4 steps for a whole run.
    pub max_steps: u64,
    /// Values below `-negative_tolerance * N_a` abort the run.
    pub negative_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self { substeps_per_day: 4, max_steps: 10_000_000, negative_tolerance: 1e-9 }
    }
}

impl SolverOptions {
    pub fn dt(&self) -> f64 {
        1.0 / self.substeps_per_day as f64
    }

    pub fn total_steps(&self, horizon: u32) -> u64 {
        horizon as u64 * self.substeps_per_day as u64
    }

    pub fn check(&self, horizon: u32) -> Result<()> {
        ensure_config!(self.substeps_per_day >= 1, "substeps_per_day must be >= 1");
        ensure_config!(
            self.negative_tolerance.is_finite() && self.negative_tolerance >= 0.0,
            "negative_tolerance must be finite and >= 0, got {}",
            self.negative_tolerance
        );
        let steps = self.total_steps(horizon);
        ensure_config!(
            steps <= self.max_steps,
            "{} days at {} steps/day needs {} steps, above the limit of {}",
            horizon, self.substeps_per_day, steps, self.max_steps
        );
        Ok(())
    }
}

/// An epoch paired with the contact matrix in force during it.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochContact {
    pub epoch: Epoch,
    pub contact: ContactMatrix,
}

/// Per-cohort sums of a flat state vector.
pub fn cohort_totals(y: &[f64]) -> Vec<f64> {
    y.chunks(N_COMPARTMENTS).map(|block| block.iter().sum()).collect()
}

/// Multi-cohort SEIR model with a severe branch ending in death.
pub struct SeimrdModel {
    pub params: DiseaseParams,
    /// N[a], fixed for the run
    pub pop: Vec<f64>,
}

impl SeimrdModel {
    pub fn new(params: DiseaseParams, pop: Vec<f64>) -> Result<Self> {
        ensure_config!(!pop.is_empty(), "at least one cohort is required");
        for (a, n) in pop.iter().enumerate() {
            ensure_config!(n.is_finite() && *n > 0.0, "population of cohort {} must be finite and > 0, got {}", a, n);
        }
        params.check(pop.len())?;
        Ok(Self { params, pop })
    }

    /// Build with `N[a]` taken from the cohort sums of `initial`.
    pub fn from_initial_state(params: DiseaseParams, initial: &[f64]) -> Result<Self> {
        check_state_shape(initial)?;
        Self::new(params, cohort_totals(initial))
    }

    pub fn n_cohorts(&self) -> usize {
        self.pop.len()
    }

    pub fn state_size(&self) -> usize {
        self.n_cohorts() * N_COMPARTMENTS
    }

    pub fn deriv(&self, y: &[f64], contact: &ContactMatrix, dy: &mut [f64]) {
        let p = &self.params;
        let k = self.n_cohorts();

        for a in 0..k {
            // Force of infection on cohort a; severe cases stay infectious
            let mut sum = 0.0;
            for b in 0..k {
                let infectious = y[index(b, Compartment::Infectious)] + y[index(b, Compartment::Severe)];
                sum += contact.get(a, b) * infectious / self.pop[b];
            }
            let lambda = p.beta * sum;

            let s = y[index(a, Compartment::Susceptible)];
            let e = y[index(a, Compartment::Exposed)];
            let i = y[index(a, Compartment::Infectious)];
            let m = y[index(a, Compartment::Severe)];

            let infections = s * lambda;
            let onset = p.alpha * e;
            let kappa = p.kappa[a];

            dy[index(a, Compartment::Susceptible)] = -infections;
            dy[index(a, Compartment::Exposed)] = infections - onset;
            dy[index(a, Compartment::Infectious)] = (1.0 - kappa) * onset - p.gamma * i;
            dy[index(a, Compartment::Severe)] = kappa * onset - p.delta * m;
            dy[index(a, Compartment::Recovered)] = p.gamma * i;
            dy[index(a, Compartment::Dead)] = p.delta * m;
        }
    }

    /// Integrate `initial` through `plan` and record one state per whole day,
    /// day 0 included. Shapes, tiling and step budget are checked before the
    /// first step; a failing check during stepping discards the whole run.
    pub fn integrate(&self, initial: &[f64], plan: &[EpochContact], horizon: u32, solver: &SolverOptions) -> Result<TimeSeries> {
        let k = self.n_cohorts();
        check_state_shape(initial)?;
        ensure_config!(initial.len() == self.state_size(), "initial state has {} values, expected {}", initial.len(), self.state_size());
        for (a, total) in cohort_totals(initial).iter().enumerate() {
            ensure_config!(
                (total - self.pop[a]).abs() <= 1e-9 * self.pop[a],
                "initial state of cohort {} sums to {}, population is {}",
                a, total, self.pop[a]
            );
        }
        let epochs: Vec<Epoch> = plan.iter().map(|ec| ec.epoch.clone()).collect();
        validate_tiling(&epochs, horizon)?;
        for (i, ec) in plan.iter().enumerate() {
            ec.contact.check(k, &format!("epoch {}", i))?;
        }
        solver.check(horizon)?;

        let dt = solver.dt();
        let mut y = initial.to_vec();
        let mut rk = Rk4::new(y.len());
        let mut series = TimeSeries::with_capacity(k, horizon as usize + 1);
        series.push(0, y.clone());

        for ec in plan {
            debug!(start = ec.epoch.start, end = ec.epoch.end, active = ?ec.epoch.active, "integrating epoch");
            for day in ec.epoch.start..ec.epoch.end {
                for _ in 0..solver.substeps_per_day {
                    rk.step(&mut y, dt, |yy, dy| self.deriv(yy, &ec.contact, dy));
                }
                self.check_values(&y, day + 1, solver.negative_tolerance)?;
                series.push(day + 1, y.clone());
            }
        }
        Ok(series)
    }

    fn check_values(&self, y: &[f64], day: u32, tol: f64) -> Result<()> {
        for (idx, v) in y.iter().enumerate() {
            let cohort = idx / N_COMPARTMENTS;
            if !v.is_finite() || *v < -tol * self.pop[cohort] {
                let compartment = Compartment::ALL[idx % N_COMPARTMENTS];
                return Err(SimError::NumericalInstability { day, cohort, compartment, value: *v });
            }
        }
        Ok(())
    }
}

fn check_state_shape(y: &[f64]) -> Result<()> {
    ensure_config!(!y.is_empty() && y.len() % N_COMPARTMENTS == 0, "state length {} is not a positive multiple of {}", y.len(), N_COMPARTMENTS);
    for (idx, v) in y.iter().enumerate() {
        ensure_config!(v.is_finite() && *v >= 0.0, "initial state entry {} = {} must be finite and >= 0", idx, v);
    }
    Ok(())
}
