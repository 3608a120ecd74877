use crate::error::{ensure_config, Result};
use crate::math::linalg::spectral_radius;
use crate::model::{ContactMatrix, DiseaseParams};

/// Spectral radius of the next-generation matrix
/// `K[a][b] = beta * c[a][b] * (N_a / N_b) * T_b`, where
/// `T_b = (1 - kappa_b) / gamma + kappa_b / delta` is the expected time a case
/// from cohort `b` spends infectious (I or M).
pub fn basic_reproduction_number(params: &DiseaseParams, contact: &ContactMatrix, pop: &[f64]) -> Result<f64> {
    let k = pop.len();
    contact.check(k, "baseline")?;
    params.check(k)?;
    ensure_config!(pop.iter().all(|n| *n > 0.0), "populations must be > 0");

    let mut durations = Vec::with_capacity(k);
    for kappa in &params.kappa {
        let mut t = 0.0;
        if *kappa < 1.0 {
            ensure_config!(params.gamma > 0.0, "gamma must be > 0 to compute R0");
            t += (1.0 - kappa) / params.gamma;
        }
        if *kappa > 0.0 {
            ensure_config!(params.delta > 0.0, "delta must be > 0 to compute R0");
            t += kappa / params.delta;
        }
        durations.push(t);
    }

    let ngm: Vec<Vec<f64>> = (0..k)
        .map(|a| (0..k).map(|b| params.beta * contact.get(a, b) * pop[a] / pop[b] * durations[b]).collect())
        .collect();
    Ok(spectral_radius(&ngm, 10_000, 1e-10))
}

/// Beta that yields `r0` under `contact`. R0 is linear in beta, so the
/// radius at beta = 1 fixes the scale.
pub fn beta_from_r0(params: &DiseaseParams, contact: &ContactMatrix, pop: &[f64], r0: f64) -> Result<f64> {
    ensure_config!(r0.is_finite() && r0 >= 0.0, "target R0 must be finite and >= 0, got {}", r0);
    let unit = DiseaseParams { beta: 1.0, ..params.clone() };
    let rho = basic_reproduction_number(&unit, contact, pop)?;
    ensure_config!(rho > 0.0, "contact matrix admits no transmission, R0 cannot be reached");
    Ok(r0 / rho)
}
