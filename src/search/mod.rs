//! Population-based search for low-energy feasible assignments.
//!
//! # Components
//!
//! - [`Candidate`]: one gene per task, each a processor id from the task's eligible set
//! - [`FitnessEvaluator`]: 0 for a candidate that misses the deadline, else 1 / energy
//! - [`Termination`]: generation cap OR wall-clock budget
//! - [`SearchEngine`]: Init → Evaluate → Iterate → ... → Done
//!
//! Improvements of the tracked best are reported over an mpsc channel, strictly
//! in generation order. Ties in fitness are not reported: only a strictly
//! better feasible candidate replaces the tracked best.

pub mod candidate;
pub mod engine;
pub mod fitness;
pub mod termination;

pub use candidate::Candidate;
pub use engine::{makespan, Improvement, SearchEngine, SearchResult};
pub use fitness::{Assessment, FitnessEvaluator};
pub use termination::Termination;
