//! Error types for staticsync operations

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for sync runs
#[derive(Debug)]
pub enum SyncError {
	/// Invalid configuration
	InvalidConfig { message: String },

	/// Remote target could not be parsed
	InvalidTarget { target: String, message: String },

	/// Local root directory is missing or not a directory
	RootNotFound { path: PathBuf },

	/// Storage client could not be constructed
	Storage(StorageError),

	/// Existence check on the lock key failed
	LockCheck { key: String, source: StorageError },

	/// Writing the lock object failed
	LockWrite { key: String, source: StorageError },

	/// Existence check on a data key failed
	Exists { key: String, source: StorageError },

	/// Upload of a data key failed
	Upload { key: String, source: StorageError },

	/// Local file could not be opened
	LocalRead { path: PathBuf, source: io::Error },

	/// Walked path is not a descendant of the local root
	OutsideRoot { path: PathBuf, root: PathBuf },

	/// A directory entry could not be read
	Walk { message: String },

	/// A per-file task panicked or was torn down
	TaskFailed { message: String },

	/// Run cancelled before completion
	Aborted,

	/// One or more files failed; carries every collected error
	Incomplete { uploaded: usize, skipped: usize, errors: Vec<SyncError> },

	/// I/O error
	Io(io::Error),
}

impl SyncError {
	/// True for errors that belong to a single file rather than the whole run
	pub fn is_per_file(&self) -> bool {
		matches!(
			self,
			SyncError::Exists { .. }
				| SyncError::Upload { .. }
				| SyncError::LocalRead { .. }
				| SyncError::OutsideRoot { .. }
				| SyncError::TaskFailed { .. }
		)
	}

	/// Collected errors of a failed run, or just this error
	pub fn errors(&self) -> Vec<&SyncError> {
		match self {
			SyncError::Incomplete { errors, .. } => errors.iter().collect(),
			other => vec![other],
		}
	}
}

impl fmt::Display for SyncError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncError::InvalidConfig { message } => {
				write!(f, "Invalid configuration: {}", message)
			}
			SyncError::InvalidTarget { target, message } => {
				write!(f, "Invalid remote target '{}': {}", target, message)
			}
			SyncError::RootNotFound { path } => {
				write!(f, "Local directory not found: {}", path.display())
			}
			SyncError::Storage(e) => write!(f, "Failed to initialize storage client: {}", e),
			SyncError::LockCheck { key, source } => {
				write!(f, "Failed to check lock file {}: {}", key, source)
			}
			SyncError::LockWrite { key, source } => {
				write!(f, "Failed to create lock file {}: {}", key, source)
			}
			SyncError::Exists { key, source } => {
				write!(f, "Failed to check {}: {}", key, source)
			}
			SyncError::Upload { key, source } => {
				write!(f, "Failed to upload {}: {}", key, source)
			}
			SyncError::LocalRead { path, source } => {
				write!(f, "Failed to open {}: {}", path.display(), source)
			}
			SyncError::OutsideRoot { path, root } => {
				write!(f, "{} is not inside {}", path.display(), root.display())
			}
			SyncError::Walk { message } => write!(f, "Directory walk error: {}", message),
			SyncError::TaskFailed { message } => write!(f, "Sync task failed: {}", message),
			SyncError::Aborted => write!(f, "Operation aborted"),
			SyncError::Incomplete { uploaded, skipped, errors } => {
				write!(
					f,
					"{} file(s) failed ({} uploaded, {} skipped)",
					errors.len(),
					uploaded,
					skipped
				)?;
				if let Some(first) = errors.first() {
					write!(f, "; first error: {}", first)?;
				}
				Ok(())
			}
			SyncError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for SyncError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SyncError::Storage(e) => Some(e),
			SyncError::LockCheck { source, .. }
			| SyncError::LockWrite { source, .. }
			| SyncError::Exists { source, .. }
			| SyncError::Upload { source, .. } => Some(source),
			SyncError::LocalRead { source, .. } => Some(source),
			SyncError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for SyncError {
	fn from(e: io::Error) -> Self {
		SyncError::Io(e)
	}
}

impl From<StorageError> for SyncError {
	fn from(e: StorageError) -> Self {
		SyncError::Storage(e)
	}
}

/// Errors reported by a storage client
#[derive(Debug)]
pub enum StorageError {
	/// Local I/O failure (reading the body, or the file backend)
	Io(io::Error),

	/// Backend-specific failure (transport, auth, service error)
	Backend { message: String },

	/// Key cannot be represented by this backend
	InvalidKey { key: String },

	/// No backend for this provider
	UnsupportedProvider { provider: String },
}

impl fmt::Display for StorageError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StorageError::Io(e) => write!(f, "I/O error: {}", e),
			StorageError::Backend { message } => write!(f, "{}", message),
			StorageError::InvalidKey { key } => write!(f, "Invalid object key: {}", key),
			StorageError::UnsupportedProvider { provider } => {
				write!(f, "Unsupported provider: {}", provider)
			}
		}
	}
}

impl Error for StorageError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			StorageError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for StorageError {
	fn from(e: io::Error) -> Self {
		StorageError::Io(e)
	}
}


// vim: ts=4
