//! File plumbing around the pure core. Nothing in `schedule` or `model`
//! touches the filesystem.

pub mod cohorts;
pub mod contact;
pub mod scenario;
pub mod series_csv;

pub use cohorts::{cohort_initial_state, cohort_kappa, load_cohorts_csv, CohortRow};
pub use contact::load_contact_matrix_csv;
pub use scenario::load_scenario_json;
pub use series_csv::write_tidy_csv;
