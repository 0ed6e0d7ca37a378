use std::future::Future;

use tonic::transport::Server;

use crate::config::ServerConfig;
use crate::grpc::solver_service::SolverServiceImpl;
use crate::proto::allocation_solver_server::AllocationSolverServer;
use crate::solver::GeneticSolver;

/// Hosts one solver behind the `AllocationSolver` gRPC service.
pub struct GrpcServer {
    config: ServerConfig,
}

impl GrpcServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Serve until `shutdown` resolves; in-flight runs finish first.
    pub async fn run<F>(self, shutdown: F) -> Result<(), tonic::transport::Error>
    where
        F: Future<Output = ()>,
    {
        let solver = GeneticSolver::new(self.config.name.clone(), self.config.solver.clone());
        let service = SolverServiceImpl::new(solver);

        tracing::info!(
            solver = %self.config.name,
            addr = %self.config.listen_addr,
            population_min = self.config.solver.population_min,
            population_max = self.config.solver.population_max,
            "Starting gRPC solver server"
        );

        Server::builder()
            .add_service(AllocationSolverServer::new(service))
            .serve_with_shutdown(self.config.listen_addr, shutdown)
            .await
    }
}
