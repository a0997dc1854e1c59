//! Directory enumeration feeding the dispatcher
//!
//! The walk runs on a blocking thread and streams regular files through a
//! bounded channel, so memory stays flat however large the tree is and the
//! walk pauses whenever the dispatcher falls behind. Unreadable entries are
//! reported in-band and the walk carries on with the rest of the tree.

use ignore::WalkBuilder;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::SyncError;
use crate::exclusion::PatternMatcher;

/// Per-directory ignore file honored when `respect_ignore_files` is set
pub const IGNORE_FILE_NAME: &str = ".syncignore";

/// One item produced by the walk
#[derive(Debug)]
pub(crate) enum WalkItem {
	/// A regular file below the root
	File(PathBuf),
	/// An entry that could not be read
	Error(SyncError),
}

/// Walk settings
#[derive(Debug, Clone)]
pub(crate) struct WalkOptions {
	pub exclude: PatternMatcher,
	pub respect_ignore_files: bool,
	pub follow_symlinks: bool,
}

/// Start walking `root`; items arrive on the returned receiver
///
/// The walk stops early when the receiver is dropped or `cancel` fires.
pub(crate) fn spawn_walker(
	root: PathBuf,
	options: WalkOptions,
	capacity: usize,
	cancel: CancellationToken,
) -> (mpsc::Receiver<WalkItem>, JoinHandle<()>) {
	let (tx, rx) = mpsc::channel(capacity.max(1));
	let handle = tokio::task::spawn_blocking(move || walk(root, options, tx, cancel));
	(rx, handle)
}

fn walk(root: PathBuf, options: WalkOptions, tx: mpsc::Sender<WalkItem>, cancel: CancellationToken) {
	let mut builder = WalkBuilder::new(&root);
	builder
		.standard_filters(false)
		.follow_links(options.follow_symlinks)
		.sort_by_file_name(|a, b| a.cmp(b));
	if options.respect_ignore_files {
		builder.add_custom_ignore_filename(IGNORE_FILE_NAME);
	}
	if !options.exclude.is_empty() {
		let exclude = options.exclude;
		let filter_root = root.clone();
		builder.filter_entry(move |entry| match entry.path().strip_prefix(&filter_root) {
			Ok(rel) if !rel.as_os_str().is_empty() => !exclude.is_excluded(rel),
			_ => true,
		});
	}

	let mut files = 0usize;
	for result in builder.build() {
		if cancel.is_cancelled() {
			debug!("Walk cancelled after {} files", files);
			return;
		}

		let item = match result {
			Ok(entry) => match entry.file_type() {
				Some(ft) if ft.is_file() => {
					files += 1;
					WalkItem::File(entry.into_path())
				}
				Some(ft) if ft.is_dir() => continue,
				_ => {
					debug!("Skipping non-regular entry {}", entry.path().display());
					continue;
				}
			},
			Err(err) => WalkItem::Error(SyncError::Walk { message: err.to_string() }),
		};

		if tx.blocking_send(item).is_err() {
			debug!("Dispatcher gone, stopping walk after {} files", files);
			return;
		}
	}
	debug!("Walk of {} finished: {} files", root.display(), files);
}


// vim: ts=4
