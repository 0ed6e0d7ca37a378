//! Solver services: one configured search behind a uniform `run` contract.
//!
//! - [`GeneticSolver`]: in-process search on a blocking worker thread
//! - [`RemoteSolver`]: a solver node reached over gRPC
//!
//! Both convert every fault into [`SolveOutcome::Failed`] so a caller never
//! mistakes a failure for an empty result.

pub mod genetic;
pub mod remote;
pub mod service;

pub use genetic::{GeneticSolver, SolverRun};
pub use remote::RemoteSolver;
pub use service::{ImprovementTrace, SolveOutcome, SolveRequest, SolverService};
