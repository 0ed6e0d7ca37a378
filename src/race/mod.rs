//! Two-solver race under one shared timeout.
//!
//! Each solver runs as its own tokio task; they share only the read-only
//! problem and exchange nothing. Both are awaited against the same deadline.
//! If either misses the window the whole race is reported as timed out.

pub mod coordinator;

pub use coordinator::{Contender, ContenderResult, RaceCoordinator, RaceOutcome, RaceReport};
