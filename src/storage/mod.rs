//! Object storage capability consumed by the sync engine
//!
//! The engine only needs two operations: an existence check and an upload.
//! Implementations are shared between all concurrent file tasks through an
//! `Arc<dyn StorageClient>`, so every implementation must be safe to call
//! from many tasks at once. Retries, backoff and authentication belong to the
//! implementation, not to the engine.

mod factory;
pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;
use tokio::io::AsyncRead;

pub use crate::context::FileSyncContext;
pub use crate::error::StorageError;
pub use factory::connect;
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Readable object content handed to [`StorageClient::upload`]
pub type ObjectBody = Box<dyn AsyncRead + Send + Unpin>;

/// Storage backend used by the sync engine
#[async_trait]
pub trait StorageClient: Send + Sync {
	/// Human-readable location of this client (`s3://bucket`), used in logs
	fn location(&self) -> String;

	/// Check whether an object exists at `key`
	///
	/// A missing object is `Ok(false)`; errors are reserved for failures
	/// other than "not found".
	async fn exists(&self, key: &str) -> StorageResult<bool>;

	/// Create or overwrite the object at `key` with the content of `body`
	///
	/// Metadata fields left as `None` are not sent.
	async fn upload(
		&self,
		key: &str,
		body: ObjectBody,
		context: &FileSyncContext,
	) -> StorageResult<()>;
}

// vim: ts=4
