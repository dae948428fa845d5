use super::CatalogEntry;

use std::sync::Arc;

use tokio::sync::RwLock;

/// Holds the catalog currently served to readers.
///
/// The slot is replaced whole under the guard, never mutated element by
/// element, so any reader observes either the previous complete catalog or
/// the next complete one.
#[derive(Debug)]
pub struct CatalogStore {
	current: RwLock<Arc<[CatalogEntry]>>,
}

impl CatalogStore {
	pub fn new() -> Self {
		Self {
			current: RwLock::new(Vec::new().into()),
		}
	}

	/// Atomically discard the previous catalog and install `entries` as
	/// current.
	pub async fn replace(&self, entries: Vec<CatalogEntry>) {
		*self.current.write().await = entries.into();
	}

	/// The current catalog, safe to serialize without further
	/// synchronization. Holds the read guard only for the reference-count
	/// bump itself.
	pub async fn snapshot(&self) -> Arc<[CatalogEntry]> {
		self.current.read().await.clone()
	}
}

impl Default for CatalogStore {
	fn default() -> Self {
		Self::new()
	}
}
