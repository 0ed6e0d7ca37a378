use std::pin::Pin;

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tonic::{Request, Response, Status};

use crate::grpc::convert;
use crate::proto::allocation_solver_server::AllocationSolver;
use crate::proto::{ImprovementEvent, RunRequest, RunResponse};
use crate::solver::{GeneticSolver, SolveOutcome, SolverRun, SolverService};

type ImprovementStream = Pin<Box<dyn Stream<Item = Result<ImprovementEvent, Status>> + Send>>;

/// gRPC face of one genetic solver.
pub struct SolverServiceImpl {
    solver: GeneticSolver,
}

impl SolverServiceImpl {
    pub fn new(solver: GeneticSolver) -> Self {
        Self { solver }
    }
}

#[tonic::async_trait]
impl AllocationSolver for SolverServiceImpl {
    async fn run(&self, request: Request<RunRequest>) -> Result<Response<RunResponse>, Status> {
        let req = request.into_inner();
        tracing::info!(
            solver = %self.solver.name(),
            tasks = req.tasks.len(),
            processors = req.processors.len(),
            deadline = req.deadline,
            timeout_minutes = req.timeout_minutes,
            "Run requested"
        );

        // Setup problems are reported in-band as a failed run
        let outcome = match convert::solve_request_from_proto(&req) {
            Ok(solve) => self.solver.run(solve).await,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected run request");
                SolveOutcome::failed(e.to_string())
            }
        };

        Ok(Response::new(convert::outcome_to_response(&outcome)))
    }

    type RunStreamingStream = ImprovementStream;

    async fn run_streaming(
        &self,
        request: Request<RunRequest>,
    ) -> Result<Response<Self::RunStreamingStream>, Status> {
        let solve = convert::solve_request_from_proto(&request.into_inner())
            .map_err(|e| Status::invalid_argument(e.to_string()))?;

        let run = self.solver.spawn(solve);
        Ok(Response::new(improvement_stream(
            self.solver.name().to_string(),
            run,
        )))
    }
}

/// Forward a run's improvements, then its fate: a search that aborted or
/// was rejected ends the stream with an error status rather than a plain EOF.
fn improvement_stream(name: String, mut run: SolverRun) -> ImprovementStream {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Some(improvement) = run.improvements.recv().await {
            if tx.send(Ok(convert::improvement_to_event(&improvement))).is_err() {
                tracing::debug!(solver = %name, "Stream receiver dropped");
                break;
            }
        }

        let status = match run.handle.await {
            Ok(Ok(_)) => return,
            Ok(Err(e)) => {
                tracing::warn!(solver = %name, error = %e, "Streaming run rejected");
                Status::invalid_argument(e.to_string())
            }
            Err(e) => {
                tracing::error!(solver = %name, error = %e, "Streaming run aborted");
                Status::internal(format!("solver run aborted: {}", e))
            }
        };
        let _ = tx.send(Err(status));
    });

    Box::pin(UnboundedReceiverStream::new(rx))
}
