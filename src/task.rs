//! Blocking task execution with cooperative cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{EngineError, Result};

/// Shared cancellation flag; clones observe the same flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

/// How a submitted task ended
#[derive(Debug)]
pub enum TaskOutcome<T> {
    Completed(T),
    Cancelled,
    Failed(EngineError),
}

impl<T> TaskOutcome<T> {
    /// Classify a task result; a cancelled token wins over whatever the task returned
    pub fn from_result(result: Result<T>, token: &CancellationToken) -> Self {
        if token.is_cancelled() {
            return TaskOutcome::Cancelled;
        }
        match result {
            Ok(value) => TaskOutcome::Completed(value),
            Err(err) => TaskOutcome::Failed(err),
        }
    }
}

/// Runs a task to completion, blocking the caller until it ends
pub trait TaskExecutor {
    fn execute<T, F>(&self, token: &CancellationToken, task: F) -> TaskOutcome<T>
    where
        T: Send,
        F: FnOnce(&CancellationToken) -> Result<T> + Send;
}

/// Runs each task on a dedicated scoped worker thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadExecutor;

impl TaskExecutor for ThreadExecutor {
    fn execute<T, F>(&self, token: &CancellationToken, task: F) -> TaskOutcome<T>
    where
        T: Send,
        F: FnOnce(&CancellationToken) -> Result<T> + Send,
    {
        let joined = crossbeam::scope(|scope| scope.spawn(move |_| task(token)).join());

        match joined {
            Ok(Ok(result)) => TaskOutcome::from_result(result, token),
            Ok(Err(_)) | Err(_) => {
                log::error!("Clustering worker thread panicked");
                TaskOutcome::Failed(EngineError::TaskFailed("worker thread panicked".to_string()))
            }
        }
    }
}

/// Runs each task directly on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl TaskExecutor for InlineExecutor {
    fn execute<T, F>(&self, token: &CancellationToken, task: F) -> TaskOutcome<T>
    where
        T: Send,
        F: FnOnce(&CancellationToken) -> Result<T> + Send,
    {
        TaskOutcome::from_result(task(token), token)
    }
}
