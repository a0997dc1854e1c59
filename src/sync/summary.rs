//! Reduction of per-file results into one run outcome
//!
//! Every error is kept, in arrival order. A run succeeds only if none were
//! recorded; files uploaded before a failure stay uploaded.

use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::decision::FileOutcome;
use crate::error::SyncError;
use crate::pool::TaskResult;

/// Counts of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
	/// Files uploaded
	pub uploaded: usize,

	/// Files skipped because the object already existed
	pub skipped: usize,

	/// Files that a dry run would upload
	pub planned: usize,

	/// Wall-clock duration of the run in milliseconds
	pub elapsed_ms: u64,
}

impl SyncSummary {
	/// Number of files that reached a final state
	pub fn total(&self) -> usize {
		self.uploaded + self.skipped + self.planned
	}
}

/// Collects task results while a run is in progress
#[derive(Debug, Default)]
pub(crate) struct Aggregator {
	summary: SyncSummary,
	errors: Vec<SyncError>,
	aborted: bool,
}

impl Aggregator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record the result of one file task
	pub fn record(&mut self, result: TaskResult<Result<FileOutcome, SyncError>>) {
		match result {
			Ok(Ok(FileOutcome::Uploaded { .. })) => self.summary.uploaded += 1,
			Ok(Ok(FileOutcome::Skipped { .. })) => self.summary.skipped += 1,
			Ok(Ok(FileOutcome::Planned { .. })) => self.summary.planned += 1,
			Ok(Err(SyncError::Aborted)) => self.aborted = true,
			Ok(Err(e)) => self.errors.push(e),
			Err(join_err) if join_err.is_cancelled() => self.aborted = true,
			Err(join_err) => self.errors.push(SyncError::TaskFailed { message: join_err.to_string() }),
		}
	}

	/// Record an error that did not come from a file task
	pub fn record_error(&mut self, error: SyncError) {
		self.errors.push(error);
	}

	/// Mark the run as cancelled
	pub fn abort(&mut self) {
		self.aborted = true;
	}

	/// Reduce to the run outcome
	///
	/// Cancellation wins over file errors, since the run never finished.
	pub fn finish(mut self, elapsed: Duration) -> Result<SyncSummary, SyncError> {
		self.summary.elapsed_ms = elapsed.as_millis() as u64;
		debug!(
			"Run finished: {} uploaded, {} skipped, {} planned, {} errors, aborted={}",
			self.summary.uploaded,
			self.summary.skipped,
			self.summary.planned,
			self.errors.len(),
			self.aborted
		);

		if self.aborted {
			return Err(SyncError::Aborted);
		}
		if !self.errors.is_empty() {
			return Err(SyncError::Incomplete {
				uploaded: self.summary.uploaded,
				skipped: self.summary.skipped,
				errors: self.errors,
			});
		}
		Ok(self.summary)
	}
}


// vim: ts=4
