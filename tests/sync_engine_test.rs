/// Engine tests against real local trees and the in-memory backend
///
/// Tests verify:
/// 1. Uploaded objects carry the right keys and metadata
/// 2. Existing objects are skipped, never overwritten
/// 3. Every regular file is dispatched exactly once
/// 4. Concurrency never exceeds the configured limit
/// 5. One failing file fails the run without disturbing the others
/// 6. Setup errors never leave a lock object behind
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use staticsync::callbacks::CallbackBuilder;
use staticsync::storage::{LocalStorage, MemoryStorage};
use staticsync::{LockPolicy, RunOutcome, SyncConfig, SyncEngine, SyncError};

/// Helper to create a file, including parent directories
fn create_file(dir: &Path, name: &str, content: &str) {
	let path = dir.join(name);
	fs::create_dir_all(path.parent().unwrap()).unwrap();
	fs::write(&path, content).unwrap();
}

/// The two-file site used by most tests
fn site_tree() -> TempDir {
	let dir = TempDir::new().unwrap();
	create_file(dir.path(), "a.html", "<html>a</html>");
	create_file(dir.path(), "b/c.css", "body { color: red }");
	dir
}

fn engine(store: &Arc<MemoryStorage>, config: SyncConfig) -> SyncEngine {
	SyncEngine::new(store.clone(), config)
}

// ===================================================================
// CONCRETE SCENARIOS
// ===================================================================

#[tokio::test]
async fn test_empty_remote_uploads_everything_then_locks() {
	let dir = site_tree();
	let store = Arc::new(MemoryStorage::new());
	let lines = Arc::new(Mutex::new(Vec::new()));
	let sink = lines.clone();
	let callbacks = CallbackBuilder::new()
		.on_file_uploaded(move |path, key| {
			sink.lock().unwrap().push(format!("Uploaded {} to {}", path.display(), key))
		})
		.build();

	let outcome = engine(&store, SyncConfig::default())
		.with_callbacks(Arc::from(callbacks))
		.run(dir.path(), "site/", ".lock")
		.await
		.expect("Sync should succeed");

	match outcome {
		RunOutcome::Synced(summary) => {
			assert_eq!(summary.uploaded, 2);
			assert_eq!(summary.skipped, 0);
		}
		other => panic!("expected a sync, got {:?}", other),
	}

	assert_eq!(store.keys(), vec!["site/.lock", "site/a.html", "site/b/c.css"]);
	let html = store.get("site/a.html").unwrap();
	assert_eq!(html.data, b"<html>a</html>");
	assert_eq!(html.context.content_type.as_deref(), Some("text/html; charset=UTF-8"));
	let css = store.get("site/b/c.css").unwrap();
	assert_eq!(css.context.content_type.as_deref(), Some("text/css; charset=UTF-8"));
	assert!(store.get("site/.lock").unwrap().data.is_empty());

	let lines = lines.lock().unwrap();
	assert_eq!(lines.len(), 2);
	assert!(lines.iter().all(|l| l.starts_with("Uploaded ")));
}

#[tokio::test]
async fn test_existing_object_is_skipped() {
	let dir = site_tree();
	let store = Arc::new(MemoryStorage::new());
	store.insert("site/a.html", "remote version");
	let skipped = Arc::new(Mutex::new(Vec::new()));
	let sink = skipped.clone();
	let callbacks =
		CallbackBuilder::new().on_file_skipped(move |key| sink.lock().unwrap().push(key.to_string())).build();

	let outcome = engine(&store, SyncConfig::default())
		.with_callbacks(Arc::from(callbacks))
		.run(dir.path(), "site", ".lock")
		.await
		.unwrap();

	let RunOutcome::Synced(summary) = outcome else { panic!("expected a sync") };
	assert_eq!(summary.uploaded, 1);
	assert_eq!(summary.skipped, 1);
	assert_eq!(*skipped.lock().unwrap(), vec!["site/a.html"]);

	// Remote content untouched; one data upload plus the lock
	assert_eq!(store.get("site/a.html").unwrap().data, b"remote version");
	assert!(store.get("site/b/c.css").is_some());
	assert_eq!(store.upload_calls(), 2);
}

#[tokio::test]
async fn test_cache_control_applied_to_every_upload() {
	let dir = site_tree();
	create_file(dir.path(), "img/logo.png", "png");
	let store = Arc::new(MemoryStorage::new());
	let config = SyncConfig { cache_control: Some("public, max-age=31536000".to_string()), ..Default::default() };

	engine(&store, config).sync_directory(dir.path(), "v1").await.unwrap();

	for key in ["v1/a.html", "v1/b/c.css", "v1/img/logo.png"] {
		let obj = store.get(key).unwrap();
		assert_eq!(obj.context.cache_control.as_deref(), Some("public, max-age=31536000"), "{}", key);
	}
	assert_eq!(store.get("v1/img/logo.png").unwrap().context.content_type, None);
}

// ===================================================================
// PROPERTIES
// ===================================================================

#[tokio::test]
async fn test_second_run_uploads_nothing() {
	let dir = site_tree();
	let store = Arc::new(MemoryStorage::new());
	let engine = engine(&store, SyncConfig::default());

	let first = engine.sync_directory(dir.path(), "site").await.unwrap();
	assert_eq!(first.uploaded, 2);
	let uploads_after_first = store.upload_calls();

	let second = engine.sync_directory(dir.path(), "site").await.unwrap();
	assert_eq!(second.uploaded, 0);
	assert_eq!(second.skipped, 2);
	assert_eq!(store.upload_calls(), uploads_after_first);
}

#[tokio::test]
async fn test_every_file_dispatched_once() {
	let dir = TempDir::new().unwrap();
	let mut expected = BTreeSet::new();
	for i in 0..57 {
		let name = format!("d{}/sub{}/file{}.txt", i % 5, i % 3, i);
		create_file(dir.path(), &name, &i.to_string());
		expected.insert(format!("root/{}", name));
	}
	fs::create_dir_all(dir.path().join("empty/dir")).unwrap();

	let store = Arc::new(MemoryStorage::new());
	let config = SyncConfig { concurrency: 7, ..Default::default() };
	let summary = engine(&store, config).sync_directory(dir.path(), "root").await.unwrap();

	assert_eq!(summary.uploaded, 57);
	assert_eq!(store.exists_calls(), 57);
	assert_eq!(store.upload_calls(), 57);
	let keys: BTreeSet<String> = store.keys().into_iter().collect();
	assert_eq!(keys, expected);
}

#[tokio::test]
async fn test_lock_present_means_no_data_calls() {
	let dir = site_tree();
	let store = Arc::new(MemoryStorage::new());
	store.insert("site/.lock", "");

	let outcome = engine(&store, SyncConfig::default()).run(dir.path(), "site", ".lock").await.unwrap();

	assert_eq!(outcome, RunOutcome::Locked { key: "site/.lock".to_string() });
	assert_eq!(store.exists_calls(), 1, "only the lock key may be checked");
	assert_eq!(store.upload_calls(), 0);
	assert_eq!(store.keys(), vec!["site/.lock"]);
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
	let dir = TempDir::new().unwrap();
	for i in 0..40 {
		create_file(dir.path(), &format!("f{:02}.txt", i), "x");
	}
	let store = Arc::new(MemoryStorage::new().with_latency(Duration::from_millis(10)));
	let config = SyncConfig { concurrency: 4, ..Default::default() };

	let summary = engine(&store, config).sync_directory(dir.path(), "").await.unwrap();

	assert_eq!(summary.uploaded, 40);
	assert!(store.peak_in_flight() <= 4, "peak was {}", store.peak_in_flight());
	assert!(store.peak_in_flight() >= 2, "tasks should overlap");
}

#[tokio::test]
async fn test_single_failure_fails_run_only() {
	let dir = TempDir::new().unwrap();
	for i in 0..10 {
		create_file(dir.path(), &format!("f{}.txt", i), "x");
	}
	let store = Arc::new(MemoryStorage::new());
	store.fail_upload("site/f3.txt");
	let failed = Arc::new(Mutex::new(Vec::new()));
	let sink = failed.clone();
	let callbacks =
		CallbackBuilder::new().on_file_failed(move |key, _| sink.lock().unwrap().push(key.to_string())).build();

	let err = engine(&store, SyncConfig::default())
		.with_callbacks(Arc::from(callbacks))
		.run(dir.path(), "site", ".lock")
		.await
		.unwrap_err();

	match err {
		SyncError::Incomplete { uploaded, skipped, errors } => {
			assert_eq!(uploaded, 9);
			assert_eq!(skipped, 0);
			assert_eq!(errors.len(), 1);
			assert!(matches!(&errors[0], SyncError::Upload { key, .. } if key == "site/f3.txt"));
		}
		other => panic!("expected Incomplete, got {:?}", other),
	}
	assert_eq!(*failed.lock().unwrap(), vec!["site/f3.txt"]);
	for i in (0..10).filter(|i| *i != 3) {
		assert!(store.get(&format!("site/f{}.txt", i)).is_some());
	}
	assert!(store.get("site/.lock").is_none(), "a failed run must not lock");
}

#[tokio::test]
async fn test_no_error_is_lost() {
	let dir = TempDir::new().unwrap();
	let store = Arc::new(MemoryStorage::new());
	for i in 0..30 {
		create_file(dir.path(), &format!("f{}.txt", i), "x");
		store.fail_exists(format!("f{}.txt", i));
	}
	let config = SyncConfig { concurrency: 2, ..Default::default() };

	let err = engine(&store, config).sync_directory(dir.path(), "").await.unwrap_err();

	assert_eq!(err.errors().len(), 30);
	assert!(err.errors().iter().all(|e| matches!(e, SyncError::Exists { .. })));
	assert_eq!(store.upload_calls(), 0);
}

// ===================================================================
// EDGE CASES
// ===================================================================

#[tokio::test]
async fn test_local_file_at_lock_key_is_not_uploaded_as_data() {
	let dir = site_tree();
	create_file(dir.path(), ".lock", "stale local lock");
	let store = Arc::new(MemoryStorage::new());

	engine(&store, SyncConfig::default()).run(dir.path(), "site", ".lock").await.unwrap();

	assert!(store.get("site/.lock").unwrap().data.is_empty());
	assert_eq!(store.upload_calls(), 3);
}

#[tokio::test]
async fn test_missing_root() {
	let dir = TempDir::new().unwrap();
	let store = Arc::new(MemoryStorage::new());

	let err = engine(&store, SyncConfig::default())
		.run(&dir.path().join("nope"), "site", ".lock")
		.await
		.unwrap_err();

	assert!(matches!(err, SyncError::RootNotFound { .. }));
	assert!(store.keys().is_empty());
}

#[tokio::test]
async fn test_missing_root_does_not_lock_before_sync() {
	let dir = TempDir::new().unwrap();
	let store = Arc::new(MemoryStorage::new());
	let config = SyncConfig { lock_policy: LockPolicy::BeforeSync, ..Default::default() };

	let err = engine(&store, config).run(&dir.path().join("nope"), "site", ".lock").await.unwrap_err();

	assert!(matches!(err, SyncError::RootNotFound { .. }));
	assert!(store.keys().is_empty());
	assert_eq!(store.exists_calls(), 0);
}

#[tokio::test]
async fn test_bad_exclude_pattern_does_not_lock_before_sync() {
	let dir = site_tree();
	let store = Arc::new(MemoryStorage::new());
	let config = SyncConfig {
		lock_policy: LockPolicy::BeforeSync,
		exclude_patterns: vec!["[unclosed".to_string()],
		..Default::default()
	};

	assert!(engine(&store, config).run(dir.path(), "site", ".lock").await.is_err());
	assert!(store.keys().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_walk_error_fails_run_but_walk_continues() {
	let dir = TempDir::new().unwrap();
	create_file(dir.path(), "a.html", "a");
	create_file(dir.path(), "z/last.css", "z");
	std::os::unix::fs::symlink(dir.path().join("missing.html"), dir.path().join("m-dangling.html"))
		.unwrap();
	let store = Arc::new(MemoryStorage::new());
	let config = SyncConfig { follow_symlinks: true, ..Default::default() };

	let err = engine(&store, config).run(dir.path(), "site", ".lock").await.unwrap_err();

	match err {
		SyncError::Incomplete { uploaded, errors, .. } => {
			assert_eq!(uploaded, 2);
			assert_eq!(errors.len(), 1);
			assert!(matches!(errors[0], SyncError::Walk { .. }));
		}
		other => panic!("expected Incomplete, got {:?}", other),
	}
	assert_eq!(store.keys(), vec!["site/a.html", "site/z/last.css"]);
	assert!(store.get("site/.lock").is_none());
}

#[tokio::test]
async fn test_cancelled_run_does_not_lock() {
	let dir = site_tree();
	let store = Arc::new(MemoryStorage::new());
	let engine = engine(&store, SyncConfig::default());
	engine.cancel_token().cancel();

	let err = engine.run(dir.path(), "site", ".lock").await.unwrap_err();

	assert!(matches!(err, SyncError::Aborted));
	assert_eq!(store.upload_calls(), 0);
	assert!(store.get("site/.lock").is_none());
}

#[tokio::test]
async fn test_dry_run_plans_only() {
	let dir = site_tree();
	let store = Arc::new(MemoryStorage::new());
	store.insert("site/a.html", "remote");
	let config = SyncConfig { dry_run: true, ..Default::default() };

	let outcome = engine(&store, config).run(dir.path(), "site", ".lock").await.unwrap();

	let RunOutcome::Synced(summary) = outcome else { panic!("expected a sync") };
	assert_eq!(summary.planned, 1);
	assert_eq!(summary.skipped, 1);
	assert_eq!(summary.uploaded, 0);
	assert_eq!(store.upload_calls(), 0);
	assert_eq!(store.keys(), vec!["site/a.html"]);
}

#[tokio::test]
async fn test_excluded_files_are_not_visited() {
	let dir = site_tree();
	create_file(dir.path(), "notes.md", "private");
	create_file(dir.path(), "drafts/wip.html", "wip");
	let store = Arc::new(MemoryStorage::new());
	let config = SyncConfig {
		exclude_patterns: vec!["*.md".to_string(), "drafts".to_string()],
		..Default::default()
	};

	let summary = engine(&store, config).sync_directory(dir.path(), "site").await.unwrap();

	assert_eq!(summary.uploaded, 2);
	assert_eq!(store.exists_calls(), 2);
	assert_eq!(store.keys(), vec!["site/a.html", "site/b/c.css"]);
}

#[tokio::test]
async fn test_zero_concurrency_is_rejected() {
	let dir = site_tree();
	let store = Arc::new(MemoryStorage::new());
	let config = SyncConfig { concurrency: 0, ..Default::default() };

	let err = engine(&store, config).run(dir.path(), "site", ".lock").await.unwrap_err();
	assert!(matches!(err, SyncError::InvalidConfig { .. }));
	assert_eq!(store.exists_calls(), 0);
}

// ===================================================================
// LOCAL FILESYSTEM BACKEND
// ===================================================================

#[tokio::test]
async fn test_local_backend_end_to_end() {
	let dir = site_tree();
	let bucket = TempDir::new().unwrap();
	let store = Arc::new(LocalStorage::new(bucket.path()));

	let first = SyncEngine::new(store.clone(), SyncConfig::default())
		.run(dir.path(), "site", ".lock")
		.await
		.unwrap();
	assert!(matches!(first, RunOutcome::Synced(ref s) if s.uploaded == 2));
	assert_eq!(fs::read_to_string(bucket.path().join("site/b/c.css")).unwrap(), "body { color: red }");
	assert_eq!(fs::metadata(bucket.path().join("site/.lock")).unwrap().len(), 0);

	let second = SyncEngine::new(store, SyncConfig::default()).run(dir.path(), "site", ".lock").await.unwrap();
	assert_eq!(second, RunOutcome::Locked { key: "site/.lock".to_string() });
}

// vim: ts=4
