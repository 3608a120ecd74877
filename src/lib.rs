pub mod calibration;
pub mod error;
pub mod io;
pub mod math;
pub mod model;
pub mod scenario;
pub mod schedule;

pub use error::{Result, SimError};
pub use model::{Compartment, ContactMatrix, DiseaseParams, InterventionMatrices, SolverOptions, TimeSeries};
pub use scenario::{seed_initial_state, simulate, simulate_scheduled, simulate_with, Scenario};
pub use schedule::{Epoch, NamedInterval, Schedule};
