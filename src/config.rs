//! Configuration for staticsync runs
//!
//! Settings follow a priority chain:
//! 1. Built-in defaults (`SyncConfig::default()`)
//! 2. Config file (TOML, or JSON when the file ends in `.json`)
//! 3. Environment variables (`STATICSYNC_*` prefix)
//! 4. CLI flags (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::SyncError;
use crate::exclusion::PatternMatcher;

/// Default number of concurrent file tasks
pub const DEFAULT_CONCURRENCY: usize = 20;

// ============================================================================
// MAIN CONFIGURATION STRUCT
// ============================================================================

/// Configuration for a sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
	// ========================================================================
	// UPLOADS
	// ========================================================================
	/// Maximum number of files checked or uploaded at the same time
	pub concurrency: usize,

	/// Cache-Control header for every uploaded object (empty = unset)
	pub cache_control: Option<String>,

	/// Plan only: check existence but do not upload or write the lock
	pub dry_run: bool,

	// ========================================================================
	// LOCKING
	// ========================================================================
	/// When the lock object is written
	pub lock_policy: LockPolicy,

	// ========================================================================
	// WALKING
	// ========================================================================
	/// Glob patterns (relative to the local root) to leave out of the sync
	pub exclude_patterns: Vec<String>,

	/// Honor `.syncignore` files found in the tree
	pub respect_ignore_files: bool,

	/// Follow symlinks instead of skipping them
	pub follow_symlinks: bool,

	// ========================================================================
	// BACKENDS
	// ========================================================================
	/// Base directory for `file://` targets
	pub local_storage_root: PathBuf,

	// ========================================================================
	// OUTPUT & LOGGING
	// ========================================================================
	/// Log level (trace, debug, info, warn, error)
	pub log_level: String,
}

impl Default for SyncConfig {
	fn default() -> Self {
		SyncConfig {
			concurrency: DEFAULT_CONCURRENCY,
			cache_control: None,
			dry_run: false,
			lock_policy: LockPolicy::AfterSuccess,
			exclude_patterns: vec![],
			respect_ignore_files: false,
			follow_symlinks: false,
			local_storage_root: PathBuf::from("."),
			log_level: "info".to_string(),
		}
	}
}

impl SyncConfig {
	/// Load a config file on top of the defaults
	pub fn load(path: &Path) -> Result<Self, SyncError> {
		let content = std::fs::read_to_string(path).map_err(|e| SyncError::InvalidConfig {
			message: format!("cannot read {}: {}", path.display(), e),
		})?;

		let is_json = path.extension().map(|ext| ext == "json").unwrap_or(false);
		if is_json {
			serde_json::from_str(&content).map_err(|e| SyncError::InvalidConfig {
				message: format!("{}: {}", path.display(), e),
			})
		} else {
			toml::from_str(&content).map_err(|e| SyncError::InvalidConfig {
				message: format!("{}: {}", path.display(), e),
			})
		}
	}

	/// Apply `STATICSYNC_*` environment variables
	pub fn apply_env(&mut self) -> Result<(), SyncError> {
		self.apply_vars(|name| std::env::var(name).ok())
	}

	fn apply_vars<F>(&mut self, var: F) -> Result<(), SyncError>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(value) = var("STATICSYNC_CONCURRENCY") {
			self.concurrency = value.trim().parse().map_err(|_| SyncError::InvalidConfig {
				message: format!("STATICSYNC_CONCURRENCY: not a number: {}", value),
			})?;
		}
		if let Some(value) = var("STATICSYNC_CACHE_CONTROL") {
			self.cache_control = Some(value);
		}
		if let Some(value) = var("STATICSYNC_LOCK_POLICY") {
			self.lock_policy = value.parse()?;
		}
		if let Some(value) = var("STATICSYNC_LOG_LEVEL") {
			self.log_level = value;
		}
		Ok(())
	}

	/// Check the configuration before a run
	pub fn validate(&self) -> Result<(), SyncError> {
		if self.concurrency == 0 {
			return Err(SyncError::InvalidConfig {
				message: "concurrency must be a positive integer".to_string(),
			});
		}
		PatternMatcher::new(&self.exclude_patterns)?;
		Ok(())
	}
}

// ============================================================================
// ENUMERATIONS
// ============================================================================

/// When the lock object is created relative to the sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LockPolicy {
	/// Write the lock only after every file synced; a failed run can be retried
	#[default]
	AfterSuccess,
	/// Write the lock before walking; a failed run leaves the target locked
	BeforeSync,
}

impl FromStr for LockPolicy {
	type Err = SyncError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"after-success" => Ok(LockPolicy::AfterSuccess),
			"before-sync" => Ok(LockPolicy::BeforeSync),
			other => Err(SyncError::InvalidConfig {
				message: format!(
					"unknown lock policy '{}' (expected after-success or before-sync)",
					other
				),
			}),
		}
	}
}

impl fmt::Display for LockPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LockPolicy::AfterSuccess => write!(f, "after-success"),
			LockPolicy::BeforeSync => write!(f, "before-sync"),
		}
	}
}


// vim: ts=4
