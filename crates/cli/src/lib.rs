//! Public library modules for the CLI crate
pub mod apply;
pub mod fs_apply;
pub mod undo;

pub use apply::{ExecutionReport, Executor};
pub use undo::UndoReport;
