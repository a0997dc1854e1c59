//! Local filesystem storage backend (`file://bucket/prefix`)
//!
//! Objects are plain files under a root directory. Writes go to a temporary
//! sibling first and are renamed into place, so a concurrent reader never
//! sees a partial object. Metadata headers have no filesystem equivalent and
//! are only logged.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::{FileSyncContext, ObjectBody, StorageClient, StorageError, StorageResult};
use crate::keys::relative_key;

/// Suffix of in-progress object files
const TMP_SUFFIX: &str = ".staticsync-tmp";

/// Storage backend rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalStorage {
	root: PathBuf,
}

impl LocalStorage {
	/// Create a backend storing objects below `root`
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	/// Root directory of this backend
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Filesystem path of an object; keys must stay inside the root
	fn object_path(&self, key: &str) -> StorageResult<PathBuf> {
		match relative_key(Path::new(key)) {
			Some(rel) if !rel.is_empty() => Ok(self.root.join(rel)),
			_ => Err(StorageError::InvalidKey { key: key.to_string() }),
		}
	}
}

#[async_trait]
impl StorageClient for LocalStorage {
	fn location(&self) -> String {
		format!("file://{}", self.root.display())
	}

	async fn exists(&self, key: &str) -> StorageResult<bool> {
		let path = self.object_path(key)?;
		match fs::metadata(&path).await {
			Ok(meta) => Ok(meta.is_file()),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
			Err(e) => Err(StorageError::Io(e)),
		}
	}

	async fn upload(
		&self,
		key: &str,
		mut body: ObjectBody,
		context: &FileSyncContext,
	) -> StorageResult<()> {
		let path = self.object_path(key)?;
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).await?;
		}

		let mut tmp_name = path.as_os_str().to_owned();
		tmp_name.push(TMP_SUFFIX);
		let tmp_path = PathBuf::from(tmp_name);

		let written = async {
			let mut file = fs::File::create(&tmp_path).await?;
			tokio::io::copy(&mut body, &mut file).await?;
			file.sync_all().await?;
			fs::rename(&tmp_path, &path).await
		}
		.await;

		if let Err(e) = written {
			let _ = fs::remove_file(&tmp_path).await;
			return Err(StorageError::Io(e));
		}

		debug!(
			"Stored {} (content-type: {:?}, cache-control: {:?})",
			path.display(),
			context.content_type,
			context.cache_control
		);
		Ok(())
	}
}


// vim: ts=4
