//! Child-process execution for the build worker.

pub mod command;

pub use command::{ExecutorError, Invocation};
