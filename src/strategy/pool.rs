//! Bounded worker pool
//!
//! Runs tasks on the blocking thread pool of a tokio multi-threaded runtime.
//! Account operations block on mutexes and sleep between rounds, so they go
//! through `spawn_blocking` rather than onto the async workers. The pool size
//! is capped by `max_blocking_threads`; extra tasks queue until a worker frees
//! up.

use super::{panic_message, Task, TaskRunner};
use crate::types::BankError;
use futures::future::join_all;
use tracing::{debug, error, warn};

/// Configuration for the pooled runner
#[derive(Clone, Debug, PartialEq)]
pub struct PoolConfig {
    /// Maximum number of tasks running at once
    pub workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
        }
    }
}

impl PoolConfig {
    /// Create a new PoolConfig, falling back to the default on zero
    pub fn new(workers: usize) -> Self {
        let default = Self::default();

        let workers = if workers == 0 {
            warn!(
                default = default.workers,
                "Invalid pool workers (0), using default"
            );
            default.workers
        } else {
            workers
        };

        Self { workers }
    }
}

/// Runs tasks on a bounded tokio blocking pool
#[derive(Debug, Clone)]
pub struct PooledRunner {
    config: PoolConfig,
}

impl PooledRunner {
    pub fn new(config: PoolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

impl TaskRunner for PooledRunner {
    fn run(&self, tasks: Vec<Task>) -> Result<(), BankError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(self.config.workers)
            .thread_name("pool-worker")
            .build()
            .map_err(|e| BankError::runtime(&format!("Failed to create tokio runtime: {}", e)))?;

        debug!(tasks = tasks.len(), workers = self.config.workers, "Running tasks on pool");

        runtime.block_on(async {
            let handles: Vec<_> = tasks.into_iter().map(tokio::task::spawn_blocking).collect();

            let mut first_panic = None;
            for (index, result) in join_all(handles).await.into_iter().enumerate() {
                if let Err(join_error) = result {
                    let message = if join_error.is_panic() {
                        panic_message(join_error.into_panic().as_ref())
                    } else {
                        join_error.to_string()
                    };
                    error!(task = index, %message, "Task panicked");
                    first_panic.get_or_insert_with(|| BankError::task_panicked(index, &message));
                }
            }

            match first_panic {
                Some(error) => Err(error),
                None => Ok(()),
            }
        })
    }

    fn name(&self) -> &'static str {
        "pool"
    }
}
