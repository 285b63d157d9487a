// THEORY:
// The `parallel_pipeline` module owns the worker pool that fans a batch out.
// Every image is an independent job, so the pool needs no ordering and no
// shared result list: each submitted job gets its own oneshot channel and the
// caller joins the handles once everything has been queued.
//
// Key architectural principles:
// 1.  **Bounded queue, fixed workers**: Jobs go through a bounded mpsc queue
//     that a fixed set of worker tasks drain. The number of workers is the
//     upper bound on jobs running at the same time.
// 2.  **Blocking work off the async threads**: Decoding, blurring and drawing
//     are CPU bound. A worker hands each job to `spawn_blocking` and waits for
//     it, so it never holds more than one job.
// 3.  **Task isolation**: A failing or panicking job only poisons its own
//     handle. The worker reports the error and moves on to the next job.

use crate::error::{VisionError, VisionResult};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;

const TASK_QUEUE_DEPTH_PER_WORKER: usize = 2;

struct PoolTask<J, R> {
    job: J,
    result_sender: oneshot::Sender<VisionResult<R>>,
}

/// Receives the result of one submitted job.
pub struct TaskHandle<R> {
    result_receiver: oneshot::Receiver<VisionResult<R>>,
}

impl<R> TaskHandle<R> {
    /// Waits for the job to finish.
    pub async fn join(self) -> VisionResult<R> {
        self.result_receiver
            .await
            .unwrap_or_else(|_| Err(VisionError::WorkerPool("worker dropped the task".to_string())))
    }
}

/// A fixed set of workers draining a shared, bounded job queue.
pub struct WorkerPool<J, R> {
    task_sender: Option<mpsc::Sender<PoolTask<J, R>>>,
    workers: Vec<JoinHandle<()>>,
}

impl<J, R> WorkerPool<J, R>
where
    J: Send + 'static,
    R: Send + 'static,
{
    /// Spawns `worker_count` workers (at least one) that run `handler` for every job.
    /// Must be called from within a tokio runtime.
    pub fn new<F>(worker_count: usize, handler: F) -> Self
    where
        F: Fn(J) -> VisionResult<R> + Send + Sync + 'static,
    {
        let worker_count = worker_count.max(1);
        let (task_sender, task_receiver) =
            mpsc::channel::<PoolTask<J, R>>(worker_count * TASK_QUEUE_DEPTH_PER_WORKER);
        let task_receiver = Arc::new(Mutex::new(task_receiver));
        let handler = Arc::new(handler);

        let workers = (0..worker_count)
            .map(|worker_id| {
                let task_receiver = Arc::clone(&task_receiver);
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    loop {
                        let next = task_receiver.lock().await.recv().await;
                        let Some(PoolTask { job, result_sender }) = next else {
                            break;
                        };
                        let handler = Arc::clone(&handler);
                        let outcome = tokio::task::spawn_blocking(move || handler(job))
                            .await
                            .unwrap_or_else(|e| Err(VisionError::TaskPanicked(e.to_string())));
                        let _ = result_sender.send(outcome);
                    }
                    tracing::debug!(worker_id, "Worker stopped");
                })
            })
            .collect();

        Self {
            task_sender: Some(task_sender),
            workers,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queues a job. Waits while the queue is full. A closed pool yields a
    /// handle that resolves to an error.
    pub async fn submit(&self, job: J) -> TaskHandle<R> {
        let (result_sender, result_receiver) = oneshot::channel();
        let task = PoolTask { job, result_sender };

        let rejected = match &self.task_sender {
            Some(sender) => sender.send(task).await.err().map(|e| e.0),
            None => Some(task),
        };
        if let Some(task) = rejected {
            let _ = task
                .result_sender
                .send(Err(VisionError::WorkerPool("task queue is closed".to_string())));
        }

        TaskHandle { result_receiver }
    }

    /// Closes the queue and waits for the workers to drain it.
    pub async fn shutdown(mut self) {
        self.task_sender.take();
        for worker in std::mem::take(&mut self.workers) {
            if let Err(e) = worker.await {
                tracing::warn!("Worker ended abnormally: {}", e);
            }
        }
    }

    /// Stops the workers without waiting. Jobs already handed to the blocking
    /// pool run to completion but their results are discarded.
    pub fn abort(&self) {
        for worker in &self.workers {
            worker.abort();
        }
    }
}

impl<J, R> Drop for WorkerPool<J, R> {
    fn drop(&mut self) {
        // Best effort stop on drop
        for worker in &self.workers {
            worker.abort();
        }
    }
}
