pub mod allocation;
pub mod config;
pub mod error;
pub mod grpc;
pub mod model;
pub mod race;
pub mod search;
pub mod shutdown;
pub mod solver;

// Re-export generated protobuf types
pub mod proto {
    tonic::include_proto!("allocator");
}
