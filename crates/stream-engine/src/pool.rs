//! Fixed-capacity pool of named worker threads, one task per worker.

use crate::error::EngineError;
use std::any::Any;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Result of one task, in submission order.
#[derive(Debug)]
pub struct TaskOutcome<T> {
    pub name: String,
    /// The task's return value, or the panic message if it panicked
    pub result: Result<T, String>,
}

struct Worker<T> {
    name: String,
    handle: JoinHandle<T>,
}

/// Runs each submitted task on its own dedicated thread.
///
/// The pool accepts at most `capacity` tasks over its lifetime, so a pool
/// sized to the number of streams runs every stream concurrently.
pub struct WorkerPool<T> {
    capacity: usize,
    workers: Vec<Worker<T>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            workers: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tasks accepted so far.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Start `task` on a new thread named `culvert-<name>`.
    ///
    /// On error the task is dropped without running.
    pub fn submit<F>(&mut self, name: &str, task: F) -> Result<(), EngineError>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        if self.workers.len() >= self.capacity {
            return Err(EngineError::PoolFull {
                task: name.to_string(),
                capacity: self.capacity,
            });
        }

        let handle = thread::Builder::new()
            .name(format!("culvert-{name}"))
            .spawn(task)
            .map_err(|source| EngineError::Spawn {
                task: name.to_string(),
                source,
            })?;

        debug!("Launched worker {} of {} for '{}'", self.workers.len() + 1, self.capacity, name);
        self.workers.push(Worker {
            name: name.to_string(),
            handle,
        });
        Ok(())
    }

    /// Names of tasks whose thread has exited.
    pub fn finished(&self) -> Vec<&str> {
        self.workers
            .iter()
            .filter(|worker| worker.handle.is_finished())
            .map(|worker| worker.name.as_str())
            .collect()
    }

    /// Wait for every task.
    pub fn join(self) -> Vec<TaskOutcome<T>> {
        self.workers
            .into_iter()
            .map(|worker| TaskOutcome {
                result: worker.handle.join().map_err(panic_message),
                name: worker.name,
            })
            .collect()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
