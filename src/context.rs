//! Upload metadata shared by a run and derived per file

use std::path::Path;

use crate::content_type;

/// Run-scoped upload settings, shared read-only by all file tasks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncContext {
	/// Cache-Control header applied to every upload
	pub cache_control: Option<String>,
}

impl SyncContext {
	/// Create a context; an empty cache-control value counts as unset
	pub fn new(cache_control: Option<String>) -> Self {
		Self { cache_control: cache_control.filter(|v| !v.trim().is_empty()) }
	}

	/// Build the upload metadata for one local file
	pub fn for_file(&self, path: &Path) -> FileSyncContext {
		FileSyncContext {
			cache_control: self.cache_control.clone(),
			content_type: content_type::resolve(path).map(str::to_string),
		}
	}
}

/// Metadata for a single upload call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSyncContext {
	/// Cache-Control header, inherited from the run
	pub cache_control: Option<String>,

	/// Content-Type header, derived from the file extension
	pub content_type: Option<String>,
}


// vim: ts=4
