use anyhow::Context;
use serde::Deserialize;

use crate::scenario::seed_initial_state;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CohortRow {
    pub cohort: String,
    pub population: f64,
    pub severe_fraction: f64,
}

/// Load cohorts from a CSV with columns `cohort,population,severe_fraction`,
/// in file order.
pub fn load_cohorts_csv(path: &str) -> anyhow::Result<Vec<CohortRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open cohort CSV: {}", path))?;

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize::<CohortRow>().enumerate() {
        let row = result.with_context(|| format!("Bad cohort row {} in {}", line + 1, path))?;
        anyhow::ensure!(row.population > 0.0, "cohort '{}' has non-positive population {}", row.cohort, row.population);
        anyhow::ensure!(
            (0.0..=1.0).contains(&row.severe_fraction),
            "cohort '{}' severe_fraction {} outside [0, 1]",
            row.cohort,
            row.severe_fraction
        );
        rows.push(row);
    }
    anyhow::ensure!(!rows.is_empty(), "no cohorts in {}", path);
    Ok(rows)
}

/// Severe fraction per cohort, in file order, ready for `DiseaseParams::kappa`.
pub fn cohort_kappa(rows: &[CohortRow]) -> Vec<f64> {
    rows.iter().map(|r| r.severe_fraction).collect()
}

/// Flat initial state for `rows`, seeding `exposed[a]` and `infectious[a]`
/// into each cohort; everyone else starts susceptible.
pub fn cohort_initial_state(rows: &[CohortRow], exposed: &[f64], infectious: &[f64]) -> anyhow::Result<Vec<f64>> {
    let total: f64 = rows.iter().map(|r| r.population).sum();
    let fractions: Vec<f64> = rows.iter().map(|r| r.population / total).collect();
    Ok(seed_initial_state(total, &fractions, exposed, infectious)?)
}
