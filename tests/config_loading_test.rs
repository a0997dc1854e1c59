/// Config file loading: TOML and JSON files layered over the defaults
use std::fs;
use tempfile::TempDir;

use staticsync::{LockPolicy, SyncConfig, SyncError};

#[test]
fn test_toml_config_overrides_defaults() {
	let dir = TempDir::new().expect("Failed to create temp dir");
	let path = dir.path().join("staticsync.toml");
	fs::write(
		&path,
		r#"
concurrency = 8
cacheControl = "public, max-age=600"
lockPolicy = "before-sync"
excludePatterns = ["*.map", "drafts/**"]
"#,
	)
	.unwrap();

	let config = SyncConfig::load(&path).expect("TOML config should load");
	assert_eq!(config.concurrency, 8);
	assert_eq!(config.cache_control.as_deref(), Some("public, max-age=600"));
	assert_eq!(config.lock_policy, LockPolicy::BeforeSync);
	assert_eq!(config.exclude_patterns, vec!["*.map", "drafts/**"]);

	// Unset keys keep their defaults
	assert!(!config.dry_run);
	assert_eq!(config.log_level, "info");
	assert!(config.validate().is_ok());
}

#[test]
fn test_json_config() {
	let dir = TempDir::new().unwrap();
	let path = dir.path().join("staticsync.json");
	fs::write(&path, r#"{ "dryRun": true, "followSymlinks": true, "localStorageRoot": "/srv" }"#).unwrap();

	let config = SyncConfig::load(&path).expect("JSON config should load");
	assert!(config.dry_run);
	assert!(config.follow_symlinks);
	assert_eq!(config.local_storage_root, std::path::PathBuf::from("/srv"));
	assert_eq!(config.concurrency, 20);
}

#[test]
fn test_malformed_config() {
	let dir = TempDir::new().unwrap();
	let path = dir.path().join("bad.toml");
	fs::write(&path, "concurrency = \"lots\"").unwrap();

	let err = SyncConfig::load(&path).unwrap_err();
	assert!(matches!(err, SyncError::InvalidConfig { .. }));
}

#[test]
fn test_missing_config_file() {
	let dir = TempDir::new().unwrap();
	let err = SyncConfig::load(&dir.path().join("absent.toml")).unwrap_err();
	assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_unknown_lock_policy_in_file() {
	let dir = TempDir::new().unwrap();
	let path = dir.path().join("policy.toml");
	fs::write(&path, "lockPolicy = \"never\"").unwrap();

	assert!(SyncConfig::load(&path).is_err());
}

// vim: ts=4
