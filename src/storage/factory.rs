//! Storage client construction from a parsed target
//!
//! Known providers are `file` and, with the `s3` feature, `s3`. There are no
//! `gcp` or `azblob` backends; those targets are rejected as unsupported
//! providers like any other unknown scheme.

use std::sync::Arc;
use tracing::debug;

use super::{LocalStorage, StorageClient, StorageError};
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::target::Target;

/// Create the storage client for `target`
///
/// `file` targets resolve the bucket as a directory below the configured
/// local storage root. Providers without a compiled-in backend are a setup
/// error.
pub async fn connect(target: &Target, config: &SyncConfig) -> Result<Arc<dyn StorageClient>, SyncError> {
	debug!("Connecting to {} (provider {})", target, target.provider);

	match target.provider.as_str() {
		"file" => {
			let root = config.local_storage_root.join(&target.bucket);
			Ok(Arc::new(LocalStorage::new(root)))
		}
		#[cfg(feature = "s3")]
		"s3" => {
			let client = super::s3::S3Storage::new(&target.bucket).await?;
			Ok(Arc::new(client))
		}
		other => Err(SyncError::Storage(StorageError::UnsupportedProvider { provider: other.to_string() })),
	}
}


// vim: ts=4
