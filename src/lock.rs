//! Lock-file gate around a sync run
//!
//! The lock is an empty object stored next to the synced data. If it exists
//! when a run starts, the run does nothing. This engine only ever creates
//! it; removing it is an operator action. The lock key is an ordinary key
//! with no retention or expiry.
//!
//! [`LockPolicy`] decides when the lock is written:
//! - `AfterSuccess`: once every file synced without error. A failed run
//!   leaves no lock and can simply be retried, but two runs started at the
//!   same time are not kept apart.
//! - `BeforeSync`: right after the check, before the walk. This narrows the
//!   window for concurrent runs, but a failed run leaves the target locked.

use std::future::Future;
use std::sync::Arc;
use tracing::info;

use crate::config::LockPolicy;
use crate::context::FileSyncContext;
use crate::error::SyncError;
use crate::storage::StorageClient;
use crate::sync::SyncSummary;

/// Result of a lock-gated run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
	/// Lock object was present; nothing was synced
	Locked { key: String },
	/// Sync ran to completion
	Synced(SyncSummary),
}

/// Advisory lock on a remote prefix
pub struct LockGate {
	client: Arc<dyn StorageClient>,
	key: String,
	policy: LockPolicy,
}

impl LockGate {
	/// Create a gate for the full lock key `key`
	pub fn new(client: Arc<dyn StorageClient>, key: impl Into<String>, policy: LockPolicy) -> Self {
		Self { client, key: key.into(), policy }
	}

	/// Full key of the lock object
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Check whether the lock object exists
	pub async fn is_locked(&self) -> Result<bool, SyncError> {
		self.client
			.exists(&self.key)
			.await
			.map_err(|source| SyncError::LockCheck { key: self.key.clone(), source })
	}

	/// Write the empty lock object
	pub async fn acquire(&self) -> Result<(), SyncError> {
		self.client
			.upload(&self.key, Box::new(tokio::io::empty()), &FileSyncContext::default())
			.await
			.map_err(|source| SyncError::LockWrite { key: self.key.clone(), source })?;
		info!("Lock file {} created", self.key);
		Ok(())
	}

	/// Run `sync` unless the lock exists, writing the lock per policy
	///
	/// A dry run checks the lock but never writes it.
	pub async fn run<F, Fut>(&self, dry_run: bool, sync: F) -> Result<RunOutcome, SyncError>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<SyncSummary, SyncError>>,
	{
		if self.is_locked().await? {
			info!("Lock file {} exists, skipping sync", self.key);
			return Ok(RunOutcome::Locked { key: self.key.clone() });
		}

		if self.policy == LockPolicy::BeforeSync && !dry_run {
			self.acquire().await?;
		}

		let summary = sync().await?;

		if self.policy == LockPolicy::AfterSuccess && !dry_run {
			info!("Directory synchronized successfully; creating lock file");
			self.acquire().await?;
		}
		Ok(RunOutcome::Synced(summary))
	}
}


// vim: ts=4
