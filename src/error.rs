use thiserror::Error;

/// Problems detected before any search starts. All of them are fatal for a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetupError {
    #[error("Problem has no tasks")]
    NoTasks,

    #[error("Problem has no processors")]
    NoProcessors,

    #[error("Deadline must be a positive finite number, got {0}")]
    InvalidDeadline(f64),

    #[error("{kind} at position {position} has id {id}, expected {position}")]
    IdMismatch {
        kind: &'static str,
        position: usize,
        id: usize,
    },

    #[error("{kind} {id} has invalid {field} {value}")]
    InvalidValue {
        kind: &'static str,
        id: usize,
        field: &'static str,
        value: f64,
    },

    #[error("Task {0} has no eligible processor")]
    NoEligibleProcessor(usize),

    #[error("Task {task} lists processor {processor} which does not exist")]
    UnknownProcessor { task: usize, processor: usize },

    #[error("Task {task} lists processor {processor} which cannot host it")]
    IneligibleProcessor { task: usize, processor: usize },

    #[error("Processor {processor} references unknown processor type {type_name:?}")]
    UnknownProcessorType { processor: usize, type_name: String },

    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Error, Debug)]
pub enum AllocError {
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("Problem file error: {0}")]
    ProblemFile(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid allocation map: {0}")]
    InvalidMap(String),

    #[error("gRPC error: {0}")]
    GrpcError(#[from] tonic::Status),

    #[error("Transport error: {0}")]
    TransportError(#[from] tonic::transport::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AllocError>;
