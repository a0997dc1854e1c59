//! Tracing subscriber setup
//!
//! Diagnostics go to stderr so that stdout carries only the per-file
//! progress lines.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber with environment filter support.
///
/// `level` is the configured default. The `RUST_LOG` environment variable
/// takes precedence when set:
///
/// ```bash
/// RUST_LOG=debug staticsync sync ...
/// RUST_LOG=staticsync::sync=trace staticsync sync ...
/// ```
pub fn init_tracing(level: &str) {
	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(level))
		.unwrap_or_else(|_| EnvFilter::new("info"));

	let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

// vim: ts=4
