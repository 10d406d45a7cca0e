//! One OS thread per task
//!
//! Each task gets its own named thread (`task-<index>`), and the runner joins
//! every thread before returning. Thread names show up in audit lines, which
//! makes the trail easy to follow per task.

use super::{panic_message, Task, TaskRunner};
use crate::types::BankError;
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Spawns a dedicated thread for every task
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPerTaskRunner;

impl TaskRunner for ThreadPerTaskRunner {
    fn run(&self, tasks: Vec<Task>) -> Result<(), BankError> {
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(tasks.len());
        let mut spawn_error = None;

        for (index, task) in tasks.into_iter().enumerate() {
            match thread::Builder::new()
                .name(format!("task-{}", index))
                .spawn(task)
            {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    error!(task = index, error = %e, "Failed to spawn task thread");
                    spawn_error = Some(BankError::from(e));
                    break;
                }
            }
        }

        debug!(spawned = handles.len(), "Joining task threads");

        // Join everything that started, even after a failure
        let mut first_panic = None;
        for (index, handle) in handles.into_iter().enumerate() {
            if let Err(payload) = handle.join() {
                let message = panic_message(payload.as_ref());
                error!(task = index, %message, "Task panicked");
                first_panic.get_or_insert_with(|| BankError::task_panicked(index, &message));
            }
        }

        match spawn_error.or(first_panic) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "threads"
    }
}
