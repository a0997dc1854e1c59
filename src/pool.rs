//! Bounded worker pool for per-file tasks
//!
//! A task is spawned only after it holds one of `limit` semaphore permits,
//! and the permit moves into the task so it is released when the task ends,
//! whether it returns, fails or panics. Submission blocks the submitter,
//! never the tasks already running. Finished tasks are reaped as new ones are
//! submitted, so the number of tracked handles stays near `limit` no matter
//! how many tasks pass through the pool.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{AcquireError, Semaphore};
use tokio::task::{JoinError, JoinSet};

/// Result of one pool task as seen by the collector
pub type TaskResult<T> = Result<T, JoinError>;

/// Fixed-capacity task pool
pub struct WorkerPool<T> {
	semaphore: Arc<Semaphore>,
	tasks: JoinSet<T>,
	limit: usize,
	submitted: usize,
}

impl<T: Send + 'static> WorkerPool<T> {
	/// Create a pool running at most `limit` tasks at once (minimum 1)
	pub fn new(limit: usize) -> Self {
		let limit = limit.max(1);
		Self { semaphore: Arc::new(Semaphore::new(limit)), tasks: JoinSet::new(), limit, submitted: 0 }
	}

	/// Configured slot count
	pub fn limit(&self) -> usize {
		self.limit
	}

	/// Tasks currently holding a slot
	pub fn active(&self) -> usize {
		self.limit - self.semaphore.available_permits()
	}

	/// Total number of tasks submitted so far
	pub fn submitted(&self) -> usize {
		self.submitted
	}

	/// Wait for a free slot, then spawn `task` in it
	pub async fn submit<F>(&mut self, task: F) -> Result<(), AcquireError>
	where
		F: Future<Output = T> + Send + 'static,
	{
		let permit = self.semaphore.clone().acquire_owned().await?;
		self.tasks.spawn(async move {
			let _permit = permit;
			task.await
		});
		self.submitted += 1;
		Ok(())
	}

	/// Take the results of tasks that have already finished, without waiting
	pub fn reap(&mut self) -> Vec<TaskResult<T>> {
		let mut done = Vec::new();
		while let Some(result) = self.tasks.try_join_next() {
			done.push(result);
		}
		done
	}

	/// Wait for the next task to finish; `None` once the pool is empty
	pub async fn join_next(&mut self) -> Option<TaskResult<T>> {
		self.tasks.join_next().await
	}

	/// Stop accepting work and abort every running task
	pub fn shutdown(&mut self) {
		self.semaphore.close();
		self.tasks.abort_all();
	}
}


// vim: ts=4
