//! Problem input: task and processor records, eligibility and problem files.
//!
//! - [`TaskRecord`] / [`ProcessorRecord`]: typed records built once per run
//! - [`eligibility`]: which processors can legally host a task
//! - [`Problem`]: validated, immutable input shared by concurrent solvers
//! - [`ProblemFile`]: JSON problem definition resolved into records

pub mod eligibility;
pub mod file;
pub mod problem;
pub mod record;

pub use file::{Limits, ProblemFile, Program};
pub use problem::Problem;
pub use record::{ProcessorRecord, TaskRecord};
