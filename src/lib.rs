//! # staticsync - Lock-gated directory mirroring into object storage
//!
//! staticsync copies a local directory tree into a bucket prefix. It uploads
//! only objects that do not exist yet, runs a bounded number of file tasks at
//! once, and refuses to run when a lock object is present under the prefix.
//! The sync is additive: remote objects are never deleted or overwritten.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use staticsync::storage::LocalStorage;
//! use staticsync::{RunOutcome, SyncConfig, SyncEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(LocalStorage::new("/srv/bucket"));
//!     let config = SyncConfig { cache_control: Some("max-age=300".into()), ..Default::default() };
//!     match SyncEngine::new(store, config).run("./public".as_ref(), "site", ".lock").await? {
//!         RunOutcome::Locked { key } => println!("{} present, nothing to do", key),
//!         RunOutcome::Synced(summary) => println!("{} uploaded", summary.uploaded),
//!     }
//!     Ok(())
//! }
//! ```

pub mod callbacks;
pub mod config;
pub mod content_type;
pub mod context;
pub mod error;
pub mod exclusion;
pub mod keys;
pub mod lock;
pub mod logging;
pub mod pool;
pub mod progress;
pub mod shutdown;
pub mod storage;
pub mod sync;
pub mod target;

// Re-export commonly used types and functions
pub use config::{LockPolicy, SyncConfig};
pub use context::{FileSyncContext, SyncContext};
pub use error::{StorageError, SyncError};
pub use lock::{LockGate, RunOutcome};
pub use storage::StorageClient;
pub use sync::{FileOutcome, SyncEngine, SyncSummary};
pub use target::Target;

// vim: ts=4
