//! Sync engine: walk the local tree and dispatch one decision task per file
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use staticsync::{storage::MemoryStorage, SyncConfig, SyncEngine};
//!
//! let store = Arc::new(MemoryStorage::new());
//! let engine = SyncEngine::new(store, SyncConfig::default());
//! let outcome = engine.run("./public".as_ref(), "site", ".lock").await?;
//! ```

mod decision;
mod summary;
mod walker;

pub use decision::FileOutcome;
pub use summary::SyncSummary;
pub use walker::IGNORE_FILE_NAME;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::callbacks::{NoCallbacks, SyncCallbacks};
use crate::config::SyncConfig;
use crate::context::SyncContext;
use crate::error::SyncError;
use crate::exclusion::PatternMatcher;
use crate::keys::{join_key, remote_key};
use crate::lock::{LockGate, RunOutcome};
use crate::pool::WorkerPool;
use crate::storage::StorageClient;
use decision::{FileJob, TaskShared};
use summary::Aggregator;
use walker::{WalkItem, WalkOptions};

/// One-directional, additive sync of a local directory into a key prefix
pub struct SyncEngine {
	client: Arc<dyn StorageClient>,
	config: SyncConfig,
	callbacks: Arc<dyn SyncCallbacks>,
	cancel: CancellationToken,
}

impl SyncEngine {
	/// Create an engine for `client`
	///
	/// The client is shared by all file tasks of a run and must support
	/// concurrent calls.
	pub fn new(client: Arc<dyn StorageClient>, config: SyncConfig) -> Self {
		Self { client, config, callbacks: Arc::new(NoCallbacks), cancel: CancellationToken::new() }
	}

	/// Report per-file events to `callbacks`
	pub fn with_callbacks(mut self, callbacks: Arc<dyn SyncCallbacks>) -> Self {
		self.callbacks = callbacks;
		self
	}

	/// Use an externally owned cancellation token
	pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
		self.cancel = cancel;
		self
	}

	/// Token that cancels this engine's runs
	pub fn cancel_token(&self) -> CancellationToken {
		self.cancel.clone()
	}

	/// Configuration of this engine
	pub fn config(&self) -> &SyncConfig {
		&self.config
	}

	/// Run a full sync gated by the lock object `lock_name` under `prefix`
	///
	/// Returns [`RunOutcome::Locked`] without touching any data key if the
	/// lock object already exists. Setup errors are raised before the lock
	/// object is looked at.
	pub async fn run(&self, root: &Path, prefix: &str, lock_name: &str) -> Result<RunOutcome, SyncError> {
		let options = self.prepare(root).await?;
		let gate = LockGate::new(self.client.clone(), join_key(prefix, lock_name), self.config.lock_policy);

		gate.run(self.config.dry_run, || self.sync_tree(root, prefix, options, Some(gate.key()))).await
	}

	/// Sync `root` into `prefix` without any lock handling
	pub async fn sync_directory(&self, root: &Path, prefix: &str) -> Result<SyncSummary, SyncError> {
		let options = self.prepare(root).await?;
		self.sync_tree(root, prefix, options, None).await
	}

	/// Setup checks shared by both entry points
	async fn prepare(&self, root: &Path) -> Result<WalkOptions, SyncError> {
		self.config.validate()?;
		match tokio::fs::metadata(root).await {
			Ok(meta) if meta.is_dir() => {}
			_ => return Err(SyncError::RootNotFound { path: root.to_path_buf() }),
		}

		Ok(WalkOptions {
			exclude: PatternMatcher::new(&self.config.exclude_patterns)?,
			respect_ignore_files: self.config.respect_ignore_files,
			follow_symlinks: self.config.follow_symlinks,
		})
	}

	async fn sync_tree(
		&self,
		root: &Path,
		prefix: &str,
		options: WalkOptions,
		reserved_key: Option<&str>,
	) -> Result<SyncSummary, SyncError> {
		let started = Instant::now();
		let shared = Arc::new(TaskShared {
			client: self.client.clone(),
			context: SyncContext::new(self.config.cache_control.clone()),
			callbacks: self.callbacks.clone(),
			cancel: self.cancel.clone(),
			dry_run: self.config.dry_run,
		});

		info!(
			"Syncing {} to {} (prefix '{}', concurrency {})",
			root.display(),
			self.client.location(),
			prefix,
			self.config.concurrency
		);

		let concurrency = self.config.concurrency;
		let (mut items, walk_handle) =
			walker::spawn_walker(root.to_path_buf(), options, concurrency, self.cancel.clone());
		let mut pool = WorkerPool::new(concurrency);
		let mut aggregator = Aggregator::new();

		loop {
			let item = tokio::select! {
				biased;
				_ = self.cancel.cancelled() => None,
				item = items.recv() => item,
			};
			let Some(item) = item else { break };

			let path = match item {
				WalkItem::File(path) => path,
				WalkItem::Error(err) => {
					warn!("{}", err);
					self.callbacks.on_walk_error(&err);
					aggregator.record_error(err);
					continue;
				}
			};

			let key = match remote_key(root, &path, prefix) {
				Ok(key) => key,
				Err(err) => {
					self.callbacks.on_file_failed(&path.to_string_lossy(), &err);
					aggregator.record_error(err);
					continue;
				}
			};
			if reserved_key == Some(key.as_str()) {
				debug!("Not syncing {}: key is reserved for the lock object", path.display());
				continue;
			}

			let task = decision::sync_file(shared.clone(), FileJob { path, key });
			let admitted = tokio::select! {
				biased;
				_ = self.cancel.cancelled() => false,
				res = pool.submit(task) => res.is_ok(),
			};
			if !admitted {
				break;
			}
			for done in pool.reap() {
				aggregator.record(done);
			}
		}

		// Closing the channel stops the walker if we left the loop early
		drop(items);
		while let Some(done) = pool.join_next().await {
			aggregator.record(done);
		}
		if let Err(e) = walk_handle.await {
			aggregator.record_error(SyncError::TaskFailed { message: format!("directory walk: {}", e) });
		}
		if self.cancel.is_cancelled() {
			warn!("Sync cancelled after dispatching {} files", pool.submitted());
			aggregator.abort();
		}

		debug!("Dispatched {} files", pool.submitted());
		aggregator.finish(started.elapsed())
	}
}

// vim: ts=4
