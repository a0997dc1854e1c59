//! Pattern-based exclusion using glob patterns
//!
//! Patterns are matched against paths relative to the local root. A pattern
//! without a slash such as `*.log` matches at any depth.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

use crate::error::SyncError;

/// Compiled set of exclusion patterns
#[derive(Debug, Clone)]
pub struct PatternMatcher {
	exclude_set: GlobSet,
}

impl PatternMatcher {
	/// Compile the given patterns
	pub fn new(patterns: &[String]) -> Result<Self, SyncError> {
		let mut builder = GlobSetBuilder::new();
		for pattern in patterns {
			let glob = Glob::new(pattern).map_err(|e| SyncError::InvalidConfig {
				message: format!("invalid exclude pattern {}: {}", pattern, e),
			})?;
			builder.add(glob);
		}

		let exclude_set = builder.build().map_err(|e| SyncError::InvalidConfig {
			message: format!("failed to build exclude patterns: {}", e),
		})?;
		Ok(Self { exclude_set })
	}

	/// True if no patterns are configured
	pub fn is_empty(&self) -> bool {
		self.exclude_set.is_empty()
	}

	/// Check if a root-relative path is excluded
	pub fn is_excluded(&self, relative: &Path) -> bool {
		self.exclude_set.is_match(relative)
	}
}


// vim: ts=4
