//! Task execution strategy module
//!
//! This module defines the Strategy pattern for running a workload's tasks
//! concurrently and waiting for all of them. Workload drivers build a list of
//! independent tasks and hand it to a [`TaskRunner`]; they never touch thread
//! or runtime handles themselves. The runner is selected at runtime.

use crate::cli::RunnerType;
use crate::types::BankError;
use std::any::Any;

pub mod pool;
pub mod threads;

pub use pool::{PoolConfig, PooledRunner};
pub use threads::ThreadPerTaskRunner;

/// A unit of concurrent work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs a batch of tasks concurrently and joins them
pub trait TaskRunner: Send + Sync {
    /// Run every task to completion
    ///
    /// All tasks are joined before this returns, even when some of them
    /// panicked.
    ///
    /// # Errors
    ///
    /// - `BankError::TaskPanicked` for the first task (by index) that panicked
    /// - `BankError::Runtime` / `BankError::IoError` if workers could not be started
    fn run(&self, tasks: Vec<Task>) -> Result<(), BankError>;

    /// Short name for logs and reports
    fn name(&self) -> &'static str;
}

/// Create a task runner based on the specified runner type
///
/// `config` is only used by the pooled runner.
pub fn create_runner(runner_type: RunnerType, config: Option<PoolConfig>) -> Box<dyn TaskRunner> {
    match runner_type {
        RunnerType::Threads => Box::new(ThreadPerTaskRunner),
        RunnerType::Pool => Box::new(PooledRunner::new(config.unwrap_or_default())),
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
