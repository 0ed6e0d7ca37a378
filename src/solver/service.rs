use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::model::Problem;

/// Input of one solver run. The problem is shared, never copied or mutated.
#[derive(Debug, Clone)]
pub struct SolveRequest {
    pub problem: Arc<Problem>,
    pub timeout: Duration,
}

impl SolveRequest {
    pub fn new(problem: Arc<Problem>, timeout: Duration) -> Self {
        Self { problem, timeout }
    }
}

/// Every improving best gene vector of a run, earliest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImprovementTrace(Vec<Vec<usize>>);

impl ImprovementTrace {
    pub fn new(improvements: Vec<Vec<usize>>) -> Self {
        Self(improvements)
    }

    /// The most improved gene vector (the last one found).
    pub fn best(&self) -> Option<&[usize]> {
        self.0.last().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.0.iter().map(Vec::as_slice)
    }

    pub fn into_inner(self) -> Vec<Vec<usize>> {
        self.0
    }
}

/// Result of a solver run. A failure is never reported as an empty trace.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// At least one feasible assignment was found
    Improved {
        trace: ImprovementTrace,
        generations: u64,
    },
    /// The search ran to termination without meeting the deadline once
    NoFeasibleAllocation { generations: u64 },
    /// Setup error, internal fault or transport error
    Failed { reason: String },
}

impl SolveOutcome {
    /// Build from a finished trace: an empty trace means nothing feasible.
    pub fn from_trace(trace: ImprovementTrace, generations: u64) -> Self {
        if trace.is_empty() {
            SolveOutcome::NoFeasibleAllocation { generations }
        } else {
            SolveOutcome::Improved { trace, generations }
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        SolveOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn best(&self) -> Option<&[usize]> {
        match self {
            SolveOutcome::Improved { trace, .. } => trace.best(),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SolveOutcome::Failed { .. })
    }

    /// Turn an improvement trace that does not fit `problem` into a failure:
    /// every gene vector must cover each task once and name known processors.
    pub fn verified(self, problem: &Problem) -> Self {
        let SolveOutcome::Improved { trace, .. } = &self else {
            return self;
        };
        for (index, genes) in trace.iter().enumerate() {
            if genes.len() != problem.task_count() {
                return SolveOutcome::failed(format!(
                    "improvement {} has {} genes, expected {}",
                    index,
                    genes.len(),
                    problem.task_count()
                ));
            }
            if let Some(&gene) = genes.iter().find(|&&g| g >= problem.processor_count()) {
                return SolveOutcome::failed(format!(
                    "improvement {} names unknown processor {}",
                    index, gene
                ));
            }
        }
        self
    }
}

/// One configured search behind the `run(tasks, processors, deadline, timeout)`
/// contract. Implementations catch their own faults and report them as
/// [`SolveOutcome::Failed`].
pub trait SolverService: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self, request: SolveRequest) -> impl Future<Output = SolveOutcome> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProcessorRecord, TaskRecord};

    fn problem() -> Problem {
        let tasks = (0..3).map(|id| TaskRecord::new(id, 1.0, 2.0)).collect();
        let processors = (0..2)
            .map(|id| ProcessorRecord::new(id, 2.0).with_coefficients(0.0, 0.0, 1.0))
            .collect();
        Problem::new(tasks, processors, 10.0).unwrap()
    }

    #[test]
    fn verified_keeps_matching_traces() {
        let outcome = SolveOutcome::from_trace(ImprovementTrace::new(vec![vec![0, 1, 1]]), 4);
        assert_eq!(outcome.clone().verified(&problem()), outcome);

        let none = SolveOutcome::NoFeasibleAllocation { generations: 4 };
        assert_eq!(none.clone().verified(&problem()), none);
    }

    #[test]
    fn verified_rejects_short_vectors_and_unknown_processors() {
        let short = SolveOutcome::from_trace(ImprovementTrace::new(vec![vec![0, 1]]), 1);
        let SolveOutcome::Failed { reason } = short.verified(&problem()) else {
            panic!("short vector must fail");
        };
        assert_eq!(reason, "improvement 0 has 2 genes, expected 3");

        let trace = ImprovementTrace::new(vec![vec![0, 0, 0], vec![0, 7, 1]]);
        let SolveOutcome::Failed { reason } = SolveOutcome::from_trace(trace, 2).verified(&problem())
        else {
            panic!("unknown processor must fail");
        };
        assert_eq!(reason, "improvement 1 names unknown processor 7");
    }
}
