//! Core types - pure abstractions shared across the codebase.

mod outcome;
mod state;
mod task;

pub use outcome::{TaskError, TaskReport, TaskSummary};
pub use state::{is_shutdown, register_shutdown, setup_shutdown_handler};
pub use task::{ReloadKind, TaskKind, Variant};
