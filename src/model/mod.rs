pub mod compartment;
pub mod contact;
pub mod seimrd;
pub mod series;

pub use compartment::{Compartment, N_COMPARTMENTS};
pub use contact::{effective_contact, ContactMatrix, InterventionMatrices};
pub use seimrd::{cohort_totals, DiseaseParams, EpochContact, SeimrdModel, SolverOptions};
pub use series::{SimulationSummary, TidyRow, TimeSeries};
