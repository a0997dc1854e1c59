//! Callback traits for per-file progress reporting
//!
//! Callbacks fire from the file tasks themselves, as each file reaches its
//! final state, so implementations must be `Send + Sync` and cheap.

use std::path::Path;

use crate::error::SyncError;

// Type aliases to reduce complexity
type UploadedFn = dyn Fn(&Path, &str) + Send + Sync;
type SkippedFn = dyn Fn(&str) + Send + Sync;
type PlannedFn = dyn Fn(&Path, &str) + Send + Sync;
type FailedFn = dyn Fn(&str, &SyncError) + Send + Sync;
type WalkErrorFn = dyn Fn(&SyncError) + Send + Sync;

/// Combined callback handler for all sync events
pub trait SyncCallbacks: Send + Sync {
	/// Called after `path` was uploaded to `key`
	fn on_file_uploaded(&self, _path: &Path, _key: &str) {}

	/// Called when `key` already exists remotely and the file was skipped
	fn on_file_skipped(&self, _key: &str) {}

	/// Called in dry-run mode for a file that would be uploaded
	fn on_file_planned(&self, _path: &Path, _key: &str) {}

	/// Called when checking or uploading `key` failed
	fn on_file_failed(&self, _key: &str, _error: &SyncError) {}

	/// Called when a directory entry could not be read
	fn on_walk_error(&self, _error: &SyncError) {}
}

/// Default callback implementation that does nothing
pub struct NoCallbacks;

impl SyncCallbacks for NoCallbacks {}

/// Builder for callbacks using function closures
#[derive(Default)]
pub struct CallbackBuilder {
	uploaded: Option<Box<UploadedFn>>,
	skipped: Option<Box<SkippedFn>>,
	planned: Option<Box<PlannedFn>>,
	failed: Option<Box<FailedFn>>,
	walk_error: Option<Box<WalkErrorFn>>,
}

impl CallbackBuilder {
	/// Create a new callback builder
	pub fn new() -> Self {
		Self::default()
	}

	/// Set upload callback
	pub fn on_file_uploaded<F>(mut self, callback: F) -> Self
	where
		F: Fn(&Path, &str) + Send + Sync + 'static,
	{
		self.uploaded = Some(Box::new(callback));
		self
	}

	/// Set skip callback
	pub fn on_file_skipped<F>(mut self, callback: F) -> Self
	where
		F: Fn(&str) + Send + Sync + 'static,
	{
		self.skipped = Some(Box::new(callback));
		self
	}

	/// Set dry-run callback
	pub fn on_file_planned<F>(mut self, callback: F) -> Self
	where
		F: Fn(&Path, &str) + Send + Sync + 'static,
	{
		self.planned = Some(Box::new(callback));
		self
	}

	/// Set failure callback
	pub fn on_file_failed<F>(mut self, callback: F) -> Self
	where
		F: Fn(&str, &SyncError) + Send + Sync + 'static,
	{
		self.failed = Some(Box::new(callback));
		self
	}

	/// Set walk error callback
	pub fn on_walk_error<F>(mut self, callback: F) -> Self
	where
		F: Fn(&SyncError) + Send + Sync + 'static,
	{
		self.walk_error = Some(Box::new(callback));
		self
	}

	/// Build the callbacks handler
	pub fn build(self) -> Box<dyn SyncCallbacks> {
		Box::new(CompositeCallbacks {
			uploaded: self.uploaded,
			skipped: self.skipped,
			planned: self.planned,
			failed: self.failed,
			walk_error: self.walk_error,
		})
	}
}

/// Internal composite callbacks implementation
struct CompositeCallbacks {
	uploaded: Option<Box<UploadedFn>>,
	skipped: Option<Box<SkippedFn>>,
	planned: Option<Box<PlannedFn>>,
	failed: Option<Box<FailedFn>>,
	walk_error: Option<Box<WalkErrorFn>>,
}

impl SyncCallbacks for CompositeCallbacks {
	fn on_file_uploaded(&self, path: &Path, key: &str) {
		if let Some(ref callback) = self.uploaded {
			callback(path, key);
		}
	}

	fn on_file_skipped(&self, key: &str) {
		if let Some(ref callback) = self.skipped {
			callback(key);
		}
	}

	fn on_file_planned(&self, path: &Path, key: &str) {
		if let Some(ref callback) = self.planned {
			callback(path, key);
		}
	}

	fn on_file_failed(&self, key: &str, error: &SyncError) {
		if let Some(ref callback) = self.failed {
			callback(key, error);
		}
	}

	fn on_walk_error(&self, error: &SyncError) {
		if let Some(ref callback) = self.walk_error {
			callback(error);
		}
	}
}


// vim: ts=4
