//! Allocation matrices and energy accounting.
//!
//! - [`AllocationMatrix`]: processors × tasks grid, from genes or the persisted `MAP` form
//! - [`Decoder`]: builds an [`ExecutionReport`] with per-processor runtime and
//!   per-task energy, recording structural and reference issues as it goes
//! - [`check_program`]: semantic checks against the program declaration
//! - [`AllocationSet`]: renders the persisted `ALLOCATIONS` document

pub mod decoder;
pub mod document;
pub mod matrix;
pub mod report;

pub use decoder::{check_program, DeclaredShape, Decoder};
pub use document::{Allocation, AllocationSet};
pub use matrix::AllocationMatrix;
pub use report::{ExecutionReport, Issue, IssueKind, ProcessorSummary, TaskState};
