//! Per-file sync decision: check existence, then skip or upload
//!
//! Existing remote objects are treated as already correct. There is no
//! content comparison and nothing is overwritten.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::callbacks::SyncCallbacks;
use crate::context::SyncContext;
use crate::error::SyncError;
use crate::storage::StorageClient;

/// A walked file and the key it maps to
#[derive(Debug, Clone)]
pub(crate) struct FileJob {
	pub path: PathBuf,
	pub key: String,
}

/// Final state of a file that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
	/// Object was absent and has been uploaded
	Uploaded { key: String },
	/// Object already existed; nothing was sent
	Skipped { key: String },
	/// Dry run: object is absent and would be uploaded
	Planned { key: String },
}

/// State shared read-only by every file task of a run
pub(crate) struct TaskShared {
	pub client: Arc<dyn StorageClient>,
	pub context: SyncContext,
	pub callbacks: Arc<dyn SyncCallbacks>,
	pub cancel: CancellationToken,
	pub dry_run: bool,
}

/// Run the decision for one file and report the result through the callbacks
pub(crate) async fn sync_file(shared: Arc<TaskShared>, job: FileJob) -> Result<FileOutcome, SyncError> {
	let result = decide(&shared, &job).await;

	match &result {
		Ok(FileOutcome::Uploaded { key }) => shared.callbacks.on_file_uploaded(&job.path, key),
		Ok(FileOutcome::Skipped { key }) => shared.callbacks.on_file_skipped(key),
		Ok(FileOutcome::Planned { key }) => shared.callbacks.on_file_planned(&job.path, key),
		Err(SyncError::Aborted) => debug!("Cancelled before {} finished", job.key),
		Err(e) => shared.callbacks.on_file_failed(&job.key, e),
	}
	result
}

async fn decide(shared: &TaskShared, job: &FileJob) -> Result<FileOutcome, SyncError> {
	let key = job.key.clone();

	let exists = cancellable(&shared.cancel, shared.client.exists(&job.key))
		.await?
		.map_err(|source| SyncError::Exists { key: job.key.clone(), source })?;
	if exists {
		debug!("{} exists, skipping", job.key);
		return Ok(FileOutcome::Skipped { key });
	}
	if shared.dry_run {
		return Ok(FileOutcome::Planned { key });
	}

	let context = shared.context.for_file(&job.path);
	let file = tokio::fs::File::open(&job.path)
		.await
		.map_err(|source| SyncError::LocalRead { path: job.path.clone(), source })?;

	// The file handle moves into the upload call and is closed when it returns
	cancellable(&shared.cancel, shared.client.upload(&job.key, Box::new(file), &context))
		.await?
		.map_err(|source| SyncError::Upload { key: job.key.clone(), source })?;

	debug!("Uploaded {} as {} ({:?})", job.path.display(), job.key, context.content_type);
	Ok(FileOutcome::Uploaded { key })
}

/// Race a storage call against cancellation; the call is dropped if cancelled
async fn cancellable<F>(cancel: &CancellationToken, call: F) -> Result<F::Output, SyncError>
where
	F: Future,
{
	tokio::select! {
		biased;
		_ = cancel.cancelled() => Err(SyncError::Aborted),
		output = call => Ok(output),
	}
}


// vim: ts=4
