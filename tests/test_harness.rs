//! Shared fixtures for allocation, search and race integration tests.
//!
//! Provides small hand-checkable problems and scripted solvers whose outcome
//! and latency are fixed up front.

#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use energy_alloc::config::SolverConfig;
use energy_alloc::error::SetupError;
use energy_alloc::model::{Problem, ProcessorRecord, TaskRecord};
use energy_alloc::solver::{ImprovementTrace, SolveOutcome, SolveRequest, SolverService};

/// Processor with generous capacities and a flat power draw of `c0`.
pub fn processor(id: usize, frequency: f64, c0: f64) -> ProcessorRecord {
    ProcessorRecord::new(id, frequency)
        .with_coefficients(0.0, 0.0, c0)
        .with_capacity(4.0, 300.0, 50.0)
}

/// Task that needs `time` seconds at 2 GHz and modest resources.
pub fn task(id: usize, time: f64) -> TaskRecord {
    TaskRecord::new(id, time, 2.0)
        .with_resources(2.0, 100.0, 10.0)
        .with_communication(0.5, 0.25)
}

/// Two tasks sharing one 2 GHz processor drawing 5 W.
pub fn single_processor_problem(deadline: f64) -> Result<Problem, SetupError> {
    Problem::new(
        vec![task(0, 1.0), task(1, 1.0)],
        vec![processor(0, 2.0, 5.0)],
        deadline,
    )
}

/// Six tasks over a slow frugal processor, a fast hungry one and a middling
/// one. Loose enough that most assignments meet the deadline.
pub fn mixed_problem() -> Problem {
    let tasks = (0..6).map(|id| task(id, 0.5 + id as f64 * 0.25)).collect();
    let processors = vec![
        processor(0, 1.0, 2.0),
        processor(1, 4.0, 20.0),
        processor(2, 2.0, 6.0),
    ];
    Problem::new(tasks, processors, 12.0).expect("mixed problem is valid")
}

/// Small, fast, reproducible search settings.
pub fn quick_config(seed: u64) -> SolverConfig {
    SolverConfig::default()
        .with_population(20, 40)
        .with_max_generations(50)
        .with_seed(seed)
}

/// A solver that returns a fixed outcome after a fixed delay.
pub struct ScriptedSolver {
    name: String,
    delay: Duration,
    outcome: SolveOutcome,
}

impl ScriptedSolver {
    pub fn new(name: &str, delay: Duration, outcome: SolveOutcome) -> Self {
        Self {
            name: name.to_string(),
            delay,
            outcome,
        }
    }

    /// Finishes after `delay` with a single improvement, `genes`.
    pub fn improving(name: &str, delay: Duration, genes: Vec<usize>) -> Self {
        Self::new(
            name,
            delay,
            SolveOutcome::from_trace(ImprovementTrace::new(vec![genes]), 1),
        )
    }
}

impl SolverService for ScriptedSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, _request: SolveRequest) -> impl Future<Output = SolveOutcome> + Send {
        let delay = self.delay;
        let outcome = self.outcome.clone();
        async move {
            tokio::time::sleep(delay).await;
            outcome
        }
    }
}

pub fn shared(problem: Problem) -> Arc<Problem> {
    Arc::new(problem)
}
