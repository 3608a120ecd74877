use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ensure_config, Result, SimError};

/// K x K matrix of average daily contacts; `c[a][b]` is the contacts a member
/// of cohort `a` has with cohort `b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactMatrix(pub Vec<Vec<f64>>);

/// Modified contact matrix per intervention label.
pub type InterventionMatrices = BTreeMap<String, ContactMatrix>;

impl ContactMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self(rows)
    }

    pub fn uniform(n: usize, value: f64) -> Self {
        Self(vec![vec![value; n]; n])
    }

    pub fn zeros(n: usize) -> Self {
        Self::uniform(n, 0.0)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.0[a][b]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.0
    }

    /// Shape must be `n x n`, entries finite and non-negative.
    pub fn check(&self, n: usize, name: &str) -> Result<()> {
        ensure_config!(self.0.len() == n, "contact matrix `{}` has {} rows, expected {}", name, self.0.len(), n);
        for (a, row) in self.0.iter().enumerate() {
            ensure_config!(row.len() == n, "contact matrix `{}` row {} has {} columns, expected {}", name, a, row.len(), n);
            for (b, v) in row.iter().enumerate() {
                ensure_config!(v.is_finite() && *v >= 0.0, "contact matrix `{}` entry ({}, {}) = {} must be finite and >= 0", name, a, b, v);
            }
        }
        Ok(())
    }

    /// Cell-wise minimum with `other`. Shapes are checked by the caller.
    pub fn elementwise_min(&self, other: &ContactMatrix) -> ContactMatrix {
        let rows = self
            .0
            .iter()
            .zip(&other.0)
            .map(|(ra, rb)| ra.iter().zip(rb).map(|(a, b)| a.min(*b)).collect())
            .collect();
        ContactMatrix(rows)
    }
}

/// Contact matrix in force while `active` interventions apply: the baseline
/// when none are active, otherwise the cell-wise minimum of the baseline and
/// every active intervention's matrix, so the most restrictive measure wins
/// per cell.
pub fn effective_contact(
    baseline: &ContactMatrix,
    interventions: &InterventionMatrices,
    active: &BTreeSet<String>,
) -> Result<ContactMatrix> {
    let mut out = baseline.clone();
    for label in active {
        let m = interventions
            .get(label)
            .ok_or_else(|| SimError::Configuration(format!("no contact matrix supplied for intervention `{}`", label)))?;
        m.check(baseline.dim(), label)?;
        out = out.elementwise_min(m);
    }
    Ok(out)
}
