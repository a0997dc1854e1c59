//! Mapping of local paths to remote object keys
//!
//! Keys are forward-slash separated with no leading slash. The part of a key
//! below the remote prefix is always derived from the path relative to the
//! local root, never from an absolute path.

use std::path::{Component, Path};

use crate::error::SyncError;

/// Join a remote prefix and a relative key
///
/// Redundant slashes at the seam are collapsed, so `site/` + `.lock` and
/// `site` + `/.lock` both give `site/.lock`. An empty prefix yields the name.
pub fn join_key(prefix: &str, name: &str) -> String {
	let prefix = prefix.trim_matches('/');
	let name = name.trim_start_matches('/');
	if prefix.is_empty() {
		name.to_string()
	} else if name.is_empty() {
		prefix.to_string()
	} else {
		format!("{}/{}", prefix, name)
	}
}

/// Convert a relative filesystem path to key form
///
/// `.` components are dropped and platform separators become `/`.
/// Returns `None` if the path is absolute or climbs out with `..`.
pub fn relative_key(relative: &Path) -> Option<String> {
	let mut parts: Vec<String> = Vec::new();
	for component in relative.components() {
		match component {
			Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
			Component::CurDir => {}
			Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
		}
	}
	Some(parts.join("/"))
}

/// Derive the remote key of a walked file
///
/// `path` must be `root` itself joined with a relative path, as produced by
/// the directory walker.
pub fn remote_key(root: &Path, path: &Path, prefix: &str) -> Result<String, SyncError> {
	let outside = || SyncError::OutsideRoot { path: path.to_path_buf(), root: root.to_path_buf() };

	let relative = path.strip_prefix(root).map_err(|_| outside())?;
	let rel_key = relative_key(relative).ok_or_else(outside)?;
	if rel_key.is_empty() {
		return Err(outside());
	}
	Ok(join_key(prefix, &rel_key))
}


// vim: ts=4
