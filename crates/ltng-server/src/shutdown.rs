//! Graceful shutdown signalling

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{broadcast, watch};

/// Tells the accept loop and open connections to stop.
///
/// Clones share state, so one clone can be handed to a signal task while
/// the server holds another.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ltng_server::ShutdownCoordinator;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));
/// let mut stop = coordinator.subscribe();
/// coordinator.shutdown();
/// assert!(stop.recv().await.is_ok());
/// assert!(coordinator.is_shutting_down());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
	signal: broadcast::Sender<()>,
	triggered: Arc<AtomicBool>,
	complete: Arc<watch::Sender<bool>>,
	timeout: Duration,
}

impl ShutdownCoordinator {
	/// `timeout` bounds how long [`wait_for_shutdown`](Self::wait_for_shutdown)
	/// waits for the server to stop.
	pub fn new(timeout: Duration) -> Self {
		let (signal, _) = broadcast::channel(1);
		let (complete, _) = watch::channel(false);
		Self {
			signal,
			triggered: Arc::new(AtomicBool::new(false)),
			complete: Arc::new(complete),
			timeout,
		}
	}

	pub fn subscribe(&self) -> broadcast::Receiver<()> {
		self.signal.subscribe()
	}

	/// Starts shutting down. Calling it again has no effect.
	pub fn shutdown(&self) {
		if !self.triggered.swap(true, Ordering::SeqCst) {
			// no receivers just means nothing is running yet
			let _ = self.signal.send(());
		}
	}

	pub fn is_shutting_down(&self) -> bool {
		self.triggered.load(Ordering::SeqCst)
	}

	/// Called by the server once it has stopped accepting connections.
	pub fn notify_shutdown_complete(&self) {
		self.complete.send_replace(true);
	}

	/// Waits for [`notify_shutdown_complete`](Self::notify_shutdown_complete),
	/// at most for the configured timeout. Returns false on timeout.
	pub async fn wait_for_shutdown(&self) -> bool {
		let mut complete = self.complete.subscribe();
		tokio::time::timeout(self.timeout, complete.wait_for(|done| *done))
			.await
			.is_ok_and(|result| result.is_ok())
	}

	/// Triggers [`shutdown`](Self::shutdown) on Ctrl-C.
	pub fn shutdown_on_ctrl_c(&self) {
		let coordinator = self.clone();
		tokio::spawn(async move {
			shutdown_signal().await;
			tracing::info!("received Ctrl-C, shutting down");
			coordinator.shutdown();
		});
	}
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %err, "cannot listen for Ctrl-C");
		std::future::pending::<()>().await;
	}
}
