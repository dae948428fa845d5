//! depot-core — release artifact catalog and upload ingestion.
//!
//! The [`Core`] type wires the immutable process configuration, the shared
//! catalog store, the background rebuild task and the per-path upload locks
//! together; the HTTP surface in [`http`] is built on top of it.

pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod upload;

use catalog::{rebuilder::Rebuilder, store::CatalogStore};
use config::Config;
use upload::PathLocks;

use std::sync::Arc;

/// Composition root: everything the HTTP surface needs, explicitly owned.
///
/// The catalog slot lives here as an injectable store rather than process
/// global state; the rebuilder and the read side both receive it from this
/// struct.
pub struct Core {
	pub config: Arc<Config>,
	pub store: Arc<CatalogStore>,
	pub rebuilder: Rebuilder,
	pub locks: PathLocks,
}

impl Core {
	/// Wire up the store and the rebuild task, and schedule the initial
	/// scan. Must be called from within a tokio runtime.
	pub fn new(config: Config) -> Arc<Self> {
		let config = Arc::new(config);
		let store = Arc::new(CatalogStore::new());

		let rebuilder = Rebuilder::spawn(config.clone(), store.clone());
		rebuilder.trigger();

		Arc::new(Self {
			config,
			store,
			rebuilder,
			locks: PathLocks::default(),
		})
	}
}
