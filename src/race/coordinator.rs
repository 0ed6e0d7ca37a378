use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use uuid::Uuid;

use crate::allocation::{AllocationSet, Decoder, ExecutionReport};
use crate::config::RaceConfig;
use crate::model::Problem;
use crate::solver::{SolveOutcome, SolveRequest, SolverService};

/// What one contender produced once the race completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContenderResult {
    /// The most improved candidate, decoded
    Report {
        genes: Vec<usize>,
        report: ExecutionReport,
        improvements: usize,
    },
    NoFeasible,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contender {
    pub solver: String,
    pub result: ContenderResult,
}

impl Contender {
    pub fn report(&self) -> Option<&ExecutionReport> {
        match &self.result {
            ContenderResult::Report { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Both contenders of a completed race and which one won.
#[derive(Debug, Clone, Serialize)]
pub struct RaceReport {
    pub race_id: Uuid,
    pub decided_at: DateTime<Utc>,
    pub contenders: [Contender; 2],
    /// Index of the feasible report with the lower total energy, if any
    pub primary: Option<usize>,
}

impl RaceReport {
    pub fn primary(&self) -> Option<&Contender> {
        self.primary.map(|i| &self.contenders[i])
    }

    pub fn secondary(&self) -> Option<&Contender> {
        self.primary.map(|i| &self.contenders[1 - i])
    }

    /// Feasible reports as an allocation set, primary first.
    pub fn allocation_set(&self, problem: &Problem) -> AllocationSet {
        let mut set = AllocationSet::new(problem.task_count(), problem.processor_count());
        let order = match self.primary {
            Some(1) => [1, 0],
            _ => [0, 1],
        };
        for i in order {
            if let ContenderResult::Report { genes, .. } = &self.contenders[i].result {
                set.push_genes(genes);
            }
        }
        set
    }
}

/// How a race ended.
#[derive(Debug, Clone)]
pub enum RaceOutcome {
    Completed(RaceReport),
    /// At least one solver missed the shared window. No partial result is kept.
    TimedOut {
        race_id: Uuid,
        window: Duration,
        pending: Vec<String>,
    },
}

impl RaceOutcome {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RaceOutcome::TimedOut { .. })
    }
}

/// Runs two solvers on the same problem under one shared deadline and keeps
/// the lower-energy feasible result.
pub struct RaceCoordinator<A, B> {
    first: Arc<A>,
    second: Arc<B>,
    config: RaceConfig,
}

impl<A, B> RaceCoordinator<A, B>
where
    A: SolverService + 'static,
    B: SolverService + 'static,
{
    pub fn new(first: A, second: B, config: RaceConfig) -> Self {
        Self {
            first: Arc::new(first),
            second: Arc::new(second),
            config,
        }
    }

    pub async fn race(&self, problem: Arc<Problem>) -> RaceOutcome {
        let race_id = Uuid::new_v4();
        let window = self.config.window();
        let request = SolveRequest::new(problem.clone(), self.config.solver_timeout);
        let deadline = Instant::now() + window;

        tracing::info!(
            race_id = %race_id,
            first = %self.first.name(),
            second = %self.second.name(),
            window_ms = window.as_millis() as u64,
            "Race started"
        );

        let first = spawn_solver(Arc::clone(&self.first), request.clone());
        let second = spawn_solver(Arc::clone(&self.second), request);

        // A solver that misses the window keeps running detached
        let first = await_solver(self.first.name(), first, deadline).await;
        let second = await_solver(self.second.name(), second, deadline).await;

        let (first, second) = match (first, second) {
            (Some(first), Some(second)) => (first, second),
            (first, second) => {
                let pending: Vec<String> = [
                    (first.is_none(), self.first.name()),
                    (second.is_none(), self.second.name()),
                ]
                .into_iter()
                .filter(|(missed, _)| *missed)
                .map(|(_, name)| name.to_string())
                .collect();
                tracing::warn!(race_id = %race_id, pending = ?pending, "Race timed out");
                return RaceOutcome::TimedOut {
                    race_id,
                    window,
                    pending,
                };
            }
        };

        let decoder = Decoder::for_problem(&problem);
        let contenders = [
            contender(1, self.first.name(), first, &decoder),
            contender(2, self.second.name(), second, &decoder),
        ];
        let primary = pick_primary(&contenders, problem.deadline());

        match primary {
            Some(i) => tracing::info!(
                race_id = %race_id,
                winner = %contenders[i].solver,
                energy = contenders[i].report().map(ExecutionReport::total_energy),
                "Race decided"
            ),
            None => tracing::warn!(race_id = %race_id, "Race completed without a feasible allocation"),
        }

        RaceOutcome::Completed(RaceReport {
            race_id,
            decided_at: Utc::now(),
            contenders,
            primary,
        })
    }
}

fn spawn_solver<S>(solver: Arc<S>, request: SolveRequest) -> JoinHandle<SolveOutcome>
where
    S: SolverService + 'static,
{
    tokio::spawn(async move { solver.run(request).await })
}

/// `None` if the solver is still running at `deadline`.
async fn await_solver(
    name: &str,
    handle: JoinHandle<SolveOutcome>,
    deadline: Instant,
) -> Option<SolveOutcome> {
    match timeout_at(deadline, handle).await {
        Ok(Ok(outcome)) => Some(outcome),
        Ok(Err(e)) => {
            tracing::error!(solver = %name, error = %e, "Solver task aborted");
            Some(SolveOutcome::failed(format!("solver task aborted: {}", e)))
        }
        Err(_) => None,
    }
}

fn contender(id: usize, name: &str, outcome: SolveOutcome, decoder: &Decoder<'_>) -> Contender {
    let result = match outcome {
        SolveOutcome::Improved { trace, .. } => match trace.best() {
            Some(best) => ContenderResult::Report {
                genes: best.to_vec(),
                report: decoder.decode_genes(id, best),
                improvements: trace.len(),
            },
            None => ContenderResult::NoFeasible,
        },
        SolveOutcome::NoFeasibleAllocation { .. } => ContenderResult::NoFeasible,
        SolveOutcome::Failed { reason } => ContenderResult::Failed { reason },
    };
    Contender {
        solver: name.to_string(),
        result,
    }
}

/// Lowest total energy among clean reports that meet the deadline; ties go
/// to the first contender.
fn pick_primary(contenders: &[Contender; 2], deadline: f64) -> Option<usize> {
    contenders
        .iter()
        .enumerate()
        .filter_map(|(i, c)| {
            c.report()
                .filter(|r| !r.has_issues() && r.meets_deadline(deadline))
                .map(|r| (i, r.total_energy()))
        })
        .fold(None, |best: Option<(usize, f64)>, (i, energy)| match best {
            Some((_, e)) if e <= energy => best,
            _ => Some((i, energy)),
        })
        .map(|(i, _)| i)
}
