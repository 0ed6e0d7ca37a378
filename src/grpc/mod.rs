//! gRPC boundary: the `AllocationSolver` service, its server, and the
//! conversions between domain types and wire messages.

pub mod convert;
pub mod server;
pub mod solver_service;

pub use server::GrpcServer;
pub use solver_service::SolverServiceImpl;
