use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calibration::beta_from_r0;
use crate::error::{ensure_config, Result};
use crate::model::{
    cohort_totals, effective_contact, ContactMatrix, DiseaseParams, EpochContact, InterventionMatrices, SeimrdModel,
    SolverOptions, TimeSeries, N_COMPARTMENTS,
};
use crate::schedule::{NamedInterval, Schedule};

/// Run the whole pipeline with the default solver settings.
pub fn simulate(
    initial_state: &[f64],
    baseline: &ContactMatrix,
    interventions: &InterventionMatrices,
    intervals: &[NamedInterval],
    override_interval: &NamedInterval,
    horizon_days: u32,
    params: &DiseaseParams,
) -> Result<TimeSeries> {
    simulate_with(
        initial_state,
        baseline,
        interventions,
        intervals,
        override_interval,
        horizon_days,
        params,
        &SolverOptions::default(),
    )
}

/// Schedule the interventions, resolve each epoch's contact matrix and
/// integrate. Every input is validated before the first step.
#[allow(clippy::too_many_arguments)]
pub fn simulate_with(
    initial_state: &[f64],
    baseline: &ContactMatrix,
    interventions: &InterventionMatrices,
    intervals: &[NamedInterval],
    override_interval: &NamedInterval,
    horizon_days: u32,
    params: &DiseaseParams,
    solver: &SolverOptions,
) -> Result<TimeSeries> {
    let (_, series) = simulate_scheduled(
        initial_state,
        baseline,
        interventions,
        intervals,
        override_interval,
        horizon_days,
        params,
        solver,
    )?;
    Ok(series)
}

/// Same as [`simulate_with`], also handing back the schedule the run used.
#[allow(clippy::too_many_arguments)]
pub fn simulate_scheduled(
    initial_state: &[f64],
    baseline: &ContactMatrix,
    interventions: &InterventionMatrices,
    intervals: &[NamedInterval],
    override_interval: &NamedInterval,
    horizon_days: u32,
    params: &DiseaseParams,
    solver: &SolverOptions,
) -> Result<(Schedule, TimeSeries)> {
    let k = baseline.dim();
    ensure_config!(k > 0, "baseline contact matrix is empty");
    ensure_config!(
        initial_state.len() == k * N_COMPARTMENTS,
        "initial state has {} values, expected {} for {} cohorts",
        initial_state.len(), k * N_COMPARTMENTS, k
    );
    baseline.check(k, "baseline")?;
    for (label, m) in interventions {
        m.check(k, label)?;
    }
    solver.check(horizon_days)?;
    let model = SeimrdModel::from_initial_state(params.clone(), initial_state)?;

    let schedule = Schedule::build(intervals, override_interval, horizon_days)?;
    let plan = schedule
        .epochs
        .iter()
        .map(|e| -> Result<EpochContact> {
            Ok(EpochContact { epoch: e.clone(), contact: effective_contact(baseline, interventions, &e.active)? })
        })
        .collect::<Result<Vec<_>>>()?;

    let series = model.integrate(initial_state, &plan, horizon_days, solver)?;
    info!(cohorts = k, epochs = plan.len(), days = horizon_days, "simulation complete");
    Ok((schedule, series))
}

/// Split `total_population` across cohorts by `fractions` and seed each
/// cohort's E and I; the remainder starts susceptible.
pub fn seed_initial_state(total_population: f64, fractions: &[f64], exposed: &[f64], infectious: &[f64]) -> Result<Vec<f64>> {
    let k = fractions.len();
    ensure_config!(k > 0, "at least one cohort fraction is required");
    ensure_config!(total_population.is_finite() && total_population > 0.0, "total population must be > 0");
    ensure_config!(exposed.len() == k && infectious.len() == k, "seed vectors must have {} entries", k);
    ensure_config!(fractions.iter().all(|f| *f > 0.0), "cohort fractions must be > 0");
    let sum: f64 = fractions.iter().sum();
    ensure_config!((sum - 1.0).abs() <= 1e-9, "cohort fractions sum to {}, expected 1", sum);

    let mut y = vec![0.0; k * N_COMPARTMENTS];
    for a in 0..k {
        let n = total_population * fractions[a];
        let (e, i) = (exposed[a], infectious[a]);
        ensure_config!(e >= 0.0 && i >= 0.0 && e + i <= n, "seeds for cohort {} exceed its population {}", a, n);
        let base = a * N_COMPARTMENTS;
        y[base] = n - e - i;
        y[base + 1] = e;
        y[base + 2] = i;
    }
    Ok(y)
}

/// Every input of one run as a single serde value, for JSON files and
/// request bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub initial_state: Vec<f64>,
    pub baseline: ContactMatrix,
    #[serde(default)]
    pub interventions: InterventionMatrices,
    #[serde(default)]
    pub intervals: Vec<NamedInterval>,
    pub override_interval: NamedInterval,
    pub horizon_days: u32,
    pub params: DiseaseParams,
    /// When set, `params.beta` is replaced so the baseline matrix gives this R0.
    #[serde(default)]
    pub target_r0: Option<f64>,
    #[serde(default)]
    pub solver: SolverOptions,
}

impl Scenario {
    /// Parameters actually used for the run.
    pub fn resolved_params(&self) -> Result<DiseaseParams> {
        let mut params = self.params.clone();
        if let Some(r0) = self.target_r0 {
            let pop = cohort_totals(&self.initial_state);
            params.beta = beta_from_r0(&params, &self.baseline, &pop, r0)?;
        }
        Ok(params)
    }

    pub fn schedule(&self) -> Result<Schedule> {
        Schedule::build(&self.intervals, &self.override_interval, self.horizon_days)
    }

    pub fn run(&self) -> Result<TimeSeries> {
        self.run_scheduled().map(|(_, series)| series)
    }

    /// Run once and return the schedule alongside the series.
    pub fn run_scheduled(&self) -> Result<(Schedule, TimeSeries)> {
        let params = self.resolved_params()?;
        simulate_scheduled(
            &self.initial_state,
            &self.baseline,
            &self.interventions,
            &self.intervals,
            &self.override_interval,
            self.horizon_days,
            &params,
            &self.solver,
        )
    }
}
