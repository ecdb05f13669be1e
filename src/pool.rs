//! The caller-supplied task submission abstraction. The engine never owns
//! or shuts down a worker pool; it only submits units of work and, on
//! cancellation, aborts the handles it was given back.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::error::DagResult;

pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A handle to a unit of work submitted to a [`WorkerPool`]. Dropping or
/// aborting it is the scheduler's best-effort cancellation mechanism.
pub struct TaskHandle {
    join: tokio::task::JoinHandle<()>,
}

impl TaskHandle {
    pub fn abort(&self) {
        self.join.abort();
    }
}

/// Abstracts over whatever executes a node's work. The engine submits
/// futures; it never inspects or awaits the returned handle except to abort
/// it on cancellation.
pub trait WorkerPool: Send + Sync {
    fn spawn(&self, future: BoxFuture) -> DagResult<TaskHandle>;
}

/// Default worker pool: spawns onto the ambient tokio runtime, bounded by a
/// semaphore permit count so a flood of ready nodes cannot oversubscribe the
/// runtime's executor threads.
pub struct TokioWorkerPool {
    semaphore: Arc<Semaphore>,
}

impl TokioWorkerPool {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }
}

impl WorkerPool for TokioWorkerPool {
    fn spawn(&self, future: BoxFuture) -> DagResult<TaskHandle> {
        let semaphore = self.semaphore.clone();
        let join = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            future.await;
        });
        Ok(TaskHandle { join })
    }
}
