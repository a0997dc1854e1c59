//! Signal handlers for graceful termination

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Cancel `token` on the first SIGINT or SIGTERM
///
/// In-flight storage calls are dropped and no new files are dispatched;
/// files that were already uploaded stay uploaded. A second signal exits
/// immediately.
pub fn setup_signal_handlers(token: CancellationToken) {
	tokio::spawn(async move {
		wait_for_signal().await;
		warn!("Shutdown requested, cancelling sync...");
		token.cancel();

		wait_for_signal().await;
		debug!("Second signal received, exiting");
		std::process::exit(130); // 128 + SIGINT(2)
	});
}

#[cfg(unix)]
async fn wait_for_signal() {
	use tokio::signal::unix::{signal, SignalKind};

	let mut sigterm = match signal(SignalKind::terminate()) {
		Ok(stream) => stream,
		Err(e) => {
			warn!("Failed to setup SIGTERM handler: {}. Process will not handle SIGTERM gracefully.", e);
			let _ = tokio::signal::ctrl_c().await;
			return;
		}
	};

	tokio::select! {
		_ = sigterm.recv() => debug!("Received SIGTERM"),
		_ = tokio::signal::ctrl_c() => debug!("Received SIGINT"),
	}
}

#[cfg(not(unix))]
async fn wait_for_signal() {
	let _ = tokio::signal::ctrl_c().await;
}

// vim: ts=4
