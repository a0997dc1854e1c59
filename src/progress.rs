//! Progress display callback for the CLI
//!
//! Prints one line per finished file to stdout. Diagnostics stay on the
//! tracing subscriber (stderr).

use std::io::Write;
use std::path::Path;
use tracing::error;

use crate::callbacks::SyncCallbacks;
use crate::error::SyncError;

/// Line-per-file progress printer
#[derive(Debug, Default)]
pub struct CliProgressCallback;

impl CliProgressCallback {
	/// Create a new progress printer
	pub fn new() -> Self {
		Self::default()
	}

	fn print(&self, line: String) {
		// A single write call per line keeps lines from concurrent tasks intact
		let mut out = std::io::stdout().lock();
		let _ = writeln!(out, "{}", line);
	}
}

impl SyncCallbacks for CliProgressCallback {
	fn on_file_uploaded(&self, path: &Path, key: &str) {
		self.print(format!("Uploaded {} to {}", path.display(), key));
	}

	fn on_file_skipped(&self, key: &str) {
		self.print(format!("Skipping existing file: {}", key));
	}

	fn on_file_planned(&self, path: &Path, key: &str) {
		self.print(format!("Would upload {} to {}", path.display(), key));
	}

	fn on_file_failed(&self, key: &str, err: &SyncError) {
		error!("{}: {}", key, err);
	}

	fn on_walk_error(&self, err: &SyncError) {
		error!("{}", err);
	}
}

// vim: ts=4
