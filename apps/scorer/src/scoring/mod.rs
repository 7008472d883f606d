// Scoring Engine: walks the reports in input order, asks the model for one
// validated annotation per report and persists the output after each one.
// Exactly one model call is in flight at a time.

pub mod engine;
pub mod outcome;

pub use engine::{RunOptions, ScoringEngine};
