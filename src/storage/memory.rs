//! In-memory storage backend
//!
//! Keeps objects in a mutex-guarded map. Besides serving as a backend for
//! library users, it records call counts and the peak number of concurrent
//! calls, and can be told to fail for specific keys.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::io::AsyncReadExt;

use super::{FileSyncContext, ObjectBody, StorageClient, StorageError, StorageResult};

/// Object stored by [`MemoryStorage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
	pub data: Vec<u8>,
	pub context: FileSyncContext,
}

#[derive(Debug, Default)]
struct Failures {
	exists: BTreeSet<String>,
	upload: BTreeSet<String>,
}

/// Thread-safe in-memory object store
#[derive(Debug, Default)]
pub struct MemoryStorage {
	objects: Mutex<BTreeMap<String, StoredObject>>,
	failures: Mutex<Failures>,
	latency: Option<Duration>,
	exists_calls: AtomicUsize,
	upload_calls: AtomicUsize,
	in_flight: AtomicUsize,
	peak_in_flight: AtomicUsize,
}

/// Decrements the in-flight counter when a call ends, however it ends
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::SeqCst);
	}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStorage {
	/// Create an empty store
	pub fn new() -> Self {
		Self::default()
	}

	/// Delay every call by `latency`, to make concurrency observable
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);
		self
	}

	/// Store an object directly, bypassing the call counters
	pub fn insert(&self, key: impl Into<String>, data: impl Into<Vec<u8>>) {
		lock(&self.objects)
			.insert(key.into(), StoredObject { data: data.into(), context: FileSyncContext::default() });
	}

	/// Fetch a stored object
	pub fn get(&self, key: &str) -> Option<StoredObject> {
		lock(&self.objects).get(key).cloned()
	}

	/// All stored keys, sorted
	pub fn keys(&self) -> Vec<String> {
		lock(&self.objects).keys().cloned().collect()
	}

	/// Make existence checks for `key` fail
	pub fn fail_exists(&self, key: impl Into<String>) {
		lock(&self.failures).exists.insert(key.into());
	}

	/// Make uploads to `key` fail
	pub fn fail_upload(&self, key: impl Into<String>) {
		lock(&self.failures).upload.insert(key.into());
	}

	/// Number of existence checks served
	pub fn exists_calls(&self) -> usize {
		self.exists_calls.load(Ordering::SeqCst)
	}

	/// Number of uploads attempted
	pub fn upload_calls(&self) -> usize {
		self.upload_calls.load(Ordering::SeqCst)
	}

	/// Highest number of calls that were in progress at the same time
	pub fn peak_in_flight(&self) -> usize {
		self.peak_in_flight.load(Ordering::SeqCst)
	}

	async fn enter(&self) -> InFlight<'_> {
		let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
		self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
		let guard = InFlight(&self.in_flight);
		if let Some(latency) = self.latency {
			tokio::time::sleep(latency).await;
		}
		guard
	}
}

#[async_trait]
impl StorageClient for MemoryStorage {
	fn location(&self) -> String {
		"memory://".to_string()
	}

	async fn exists(&self, key: &str) -> StorageResult<bool> {
		self.exists_calls.fetch_add(1, Ordering::SeqCst);
		let _in_flight = self.enter().await;

		let fail = lock(&self.failures).exists.contains(key);
		if fail {
			return Err(StorageError::Backend { message: format!("injected HEAD failure for {}", key) });
		}
		Ok(lock(&self.objects).contains_key(key))
	}

	async fn upload(
		&self,
		key: &str,
		mut body: ObjectBody,
		context: &FileSyncContext,
	) -> StorageResult<()> {
		self.upload_calls.fetch_add(1, Ordering::SeqCst);
		let _in_flight = self.enter().await;

		let fail = lock(&self.failures).upload.contains(key);
		if fail {
			return Err(StorageError::Backend { message: format!("injected PUT failure for {}", key) });
		}

		let mut data = Vec::new();
		body.read_to_end(&mut data).await?;
		lock(&self.objects)
			.insert(key.to_string(), StoredObject { data, context: context.clone() });
		Ok(())
	}
}


// vim: ts=4
