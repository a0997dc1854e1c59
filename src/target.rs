//! Remote target parsing (`scheme://bucket/prefix`)

use std::fmt;
use std::str::FromStr;

use crate::error::SyncError;
use crate::keys::join_key;

/// Parsed remote location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
	/// Storage provider, taken from the URL scheme (`s3`, `file`, ...)
	pub provider: String,

	/// Bucket or container name
	pub bucket: String,

	/// Key prefix inside the bucket, without leading or trailing slashes
	pub prefix: String,
}

impl Target {
	/// Full key of `name` under this target's prefix
	pub fn key(&self, name: &str) -> String {
		join_key(&self.prefix, name)
	}
}

impl FromStr for Target {
	type Err = SyncError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = |message: &str| SyncError::InvalidTarget {
			target: s.to_string(),
			message: message.to_string(),
		};

		let (scheme, rest) = s.split_once("://").ok_or_else(|| invalid("missing scheme"))?;
		if scheme.is_empty() {
			return Err(invalid("missing scheme"));
		}
		let (bucket, path) = match rest.split_once('/') {
			Some((bucket, path)) => (bucket, path),
			None => (rest, ""),
		};
		if bucket.is_empty() {
			return Err(invalid("missing bucket"));
		}

		Ok(Target {
			provider: scheme.to_ascii_lowercase(),
			bucket: bucket.to_string(),
			prefix: path.trim_matches('/').to_string(),
		})
	}
}

impl fmt::Display for Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.prefix.is_empty() {
			write!(f, "{}://{}", self.provider, self.bucket)
		} else {
			write!(f, "{}://{}/{}", self.provider, self.bucket, self.prefix)
		}
	}
}


// vim: ts=4
