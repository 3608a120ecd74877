use thiserror::Error;

use crate::model::Compartment;

pub type Result<T> = std::result::Result<T, SimError>;

/// Failures of the scheduling + integration pipeline. Raised before any
/// stepping starts, except for `NumericalInstability`, which aborts the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("interval `{label}` [{lo}, {hi}] lies outside the horizon [0, {horizon})")]
    InputRange { label: String, lo: i64, hi: i64, horizon: u32 },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("numerical instability at day {day}: cohort {cohort} {compartment} = {value}")]
    NumericalInstability { day: u32, cohort: usize, compartment: Compartment, value: f64 },
}

/// `anyhow::ensure!` for the core: bail with a `Configuration` error.
macro_rules! ensure_config {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::SimError::Configuration(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_config;
