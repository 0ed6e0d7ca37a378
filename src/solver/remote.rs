use std::future::Future;

use crate::error::Result;
use crate::grpc::convert;
use crate::proto::allocation_solver_client::AllocationSolverClient;
use crate::solver::service::{SolveOutcome, SolveRequest, SolverService};

/// A solver node reached over gRPC.
#[derive(Debug, Clone)]
pub struct RemoteSolver {
    name: String,
    endpoint: String,
}

impl RemoteSolver {
    /// `endpoint` is a URI such as `http://127.0.0.1:50061`; a bare
    /// `host:port` is treated as plaintext http.
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let endpoint = if endpoint.contains("://") {
            endpoint
        } else {
            format!("http://{}", endpoint)
        };
        Self {
            name: name.into(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(endpoint: String, request: SolveRequest) -> Result<SolveOutcome> {
        let mut client = AllocationSolverClient::connect(endpoint).await?;
        let response = client
            .run(convert::run_request(&request))
            .await?
            .into_inner();
        Ok(convert::outcome_from_response(response))
    }
}

impl SolverService for RemoteSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, request: SolveRequest) -> impl Future<Output = SolveOutcome> + Send {
        let name = self.name.clone();
        let endpoint = self.endpoint.clone();

        async move {
            tracing::debug!(solver = %name, endpoint = %endpoint, "Calling remote solver");
            let problem = request.problem.clone();
            match Self::call(endpoint.clone(), request).await {
                Ok(outcome @ SolveOutcome::Improved { .. }) => {
                    let outcome = outcome.verified(&problem);
                    if let SolveOutcome::Failed { reason } = &outcome {
                        tracing::warn!(solver = %name, endpoint = %endpoint, reason = %reason, "Remote solver returned a malformed trace");
                    }
                    outcome
                }
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(solver = %name, endpoint = %endpoint, error = %e, "Remote solver call failed");
                    SolveOutcome::failed(e.to_string())
                }
            }
        }
    }
}
