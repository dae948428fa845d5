use super::{scanner, store::CatalogStore};
use crate::config::Config;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::debug;

/// Handle to the background catalog rebuild task.
///
/// Triggers are fire-and-forget: [`Rebuilder::trigger`] never blocks and the
/// request that caused it is not held open waiting for the scan. The
/// generation counter of the last completed rebuild is published through a
/// watch channel so callers that need convergence can await it.
#[derive(Debug, Clone)]
pub struct Rebuilder {
	trigger_tx: mpsc::UnboundedSender<()>,
	generation_rx: watch::Receiver<u64>,
}

impl Rebuilder {
	/// Spawn the rebuild task. It exits once every handle is dropped.
	pub fn spawn(config: Arc<Config>, store: Arc<CatalogStore>) -> Self {
		let (trigger_tx, mut trigger_rx) = mpsc::unbounded_channel();
		let (generation_tx, generation_rx) = watch::channel(0u64);

		tokio::spawn(async move {
			let mut generation = 0u64;

			while trigger_rx.recv().await.is_some() {
				// Triggers that piled up while the previous scan ran are
				// all answered by this one
				while trigger_rx.try_recv().is_ok() {}

				let entries = scanner::scan(&config).await;
				store.replace(entries).await;

				generation += 1;
				let _ = generation_tx.send(generation);
				debug!("Catalog rebuild {generation} complete");
			}
		});

		Self {
			trigger_tx,
			generation_rx,
		}
	}

	/// Schedule a rebuild without waiting for it.
	pub fn trigger(&self) {
		// Send only fails when the task is gone, which means we are
		// shutting down anyway
		let _ = self.trigger_tx.send(());
	}

	/// Generation counter of the last completed rebuild.
	pub fn generation(&self) -> u64 {
		*self.generation_rx.borrow()
	}

	/// Wait until a rebuild numbered past `generation` has completed.
	pub async fn wait_past(&self, generation: u64) {
		let mut generation_rx = self.generation_rx.clone();
		let _ = generation_rx
			.wait_for(|current| *current > generation)
			.await;
	}
}
