use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::SolverConfig;
use crate::error::SetupError;
use crate::search::{Improvement, SearchEngine, SearchResult, Termination};
use crate::solver::service::{ImprovementTrace, SolveOutcome, SolveRequest, SolverService};

/// A search running on a blocking worker thread.
pub struct SolverRun {
    /// Improvements in generation order; closes when the search ends
    pub improvements: mpsc::UnboundedReceiver<Improvement>,
    pub handle: JoinHandle<Result<SearchResult, SetupError>>,
}

/// Runs the genetic search in-process.
#[derive(Debug, Clone)]
pub struct GeneticSolver {
    name: String,
    config: SolverConfig,
}

impl GeneticSolver {
    pub fn new(name: impl Into<String>, config: SolverConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Start the search without waiting for it. Each run owns its population,
    /// RNG and scratch buffers; only the problem is shared.
    pub fn spawn(&self, request: SolveRequest) -> SolverRun {
        let (tx, rx) = mpsc::unbounded_channel();
        let config = self.config.clone();
        let name = self.name.clone();

        let handle = tokio::task::spawn_blocking(move || -> Result<SearchResult, SetupError> {
            let termination = Termination::cap_or_budget(config.max_generations, request.timeout);
            let engine = SearchEngine::new(&request.problem, config, termination)?
                .with_improvements(tx);
            let result = engine.run();
            tracing::info!(
                solver = %name,
                generations = result.generations,
                feasible = result.is_feasible(),
                "Solver run complete"
            );
            Ok(result)
        });

        SolverRun {
            improvements: rx,
            handle,
        }
    }
}

impl SolverService for GeneticSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, request: SolveRequest) -> impl Future<Output = SolveOutcome> + Send {
        let solver = self.clone();

        async move {
            let SolverRun {
                mut improvements,
                handle,
            } = solver.spawn(request);
            let name = &solver.name;

            match handle.await {
                Ok(Ok(result)) => {
                    let mut trace = Vec::new();
                    while let Ok(improvement) = improvements.try_recv() {
                        trace.push(improvement.genes);
                    }
                    SolveOutcome::from_trace(ImprovementTrace::new(trace), result.generations)
                }
                Ok(Err(e)) => {
                    tracing::error!(solver = %name, error = %e, "Solver setup failed");
                    SolveOutcome::failed(e.to_string())
                }
                Err(e) => {
                    tracing::error!(solver = %name, error = %e, "Solver task aborted");
                    SolveOutcome::failed(format!("solver task aborted: {}", e))
                }
            }
        }
    }
}
