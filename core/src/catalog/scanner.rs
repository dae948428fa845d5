use super::{checksum, version, CatalogEntry};
use crate::config::Config;

use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{info, warn};

/// Filename suffixes recognized as release artifacts (archive and disk-image
/// formats).
pub const ARTIFACT_SUFFIXES: &[&str] = &[
	".tar.xz",
	".tar.gz",
	".tar.zst",
	".tar.bz2",
	".hddimg",
	".hddimg.xz",
	".hddimg.zst",
	".rpi-sdimg",
	".rpi-sdimg.xz",
	"sdimg",
];

pub fn is_artifact(filename: &str) -> bool {
	ARTIFACT_SUFFIXES
		.iter()
		.any(|suffix| filename.ends_with(suffix))
}

/// Walk every scan rule's folder and produce the aggregated catalog.
///
/// Only a rule folder's immediate entries are considered, non-recursively.
/// A folder that cannot be listed is skipped and the scan continues with the
/// remaining rules; the output order is rule order, then directory-listing
/// order within a rule.
pub async fn scan(config: &Config) -> Vec<CatalogEntry> {
	let mut entries = Vec::new();

	for rule in &config.api_config {
		let dir = config.root_folder.join(&rule.folder);

		let mut read_dir = match fs::read_dir(&dir).await {
			Ok(read_dir) => read_dir,
			Err(e) => {
				warn!("Failed to read scan folder {}: {e}", dir.display());
				continue;
			}
		};

		loop {
			let dir_entry = match read_dir.next_entry().await {
				Ok(Some(dir_entry)) => dir_entry,
				Ok(None) => break,
				Err(e) => {
					warn!("Failed to list {}: {e}", dir.display());
					break;
				}
			};

			let file_name = dir_entry.file_name();
			let Some(file_name) = file_name.to_str() else {
				warn!("Skipping non UTF-8 file name in {}", dir.display());
				continue;
			};

			if !is_artifact(file_name) {
				continue;
			}

			let path = dir_entry.path();

			let metadata = match dir_entry.metadata().await {
				Ok(metadata) => metadata,
				Err(e) => {
					warn!("Failed to stat {}: {e}", path.display());
					continue;
				}
			};
			if !metadata.is_file() {
				continue;
			}

			// A file we cannot hash still gets cataloged, just without a
			// checksum
			let checksum = match checksum::file_checksum(&path).await {
				Ok(digest) => digest,
				Err(e) => {
					warn!("Failed to hash {}: {e}", path.display());
					String::new()
				}
			};

			entries.push(CatalogEntry {
				download_url: format!(
					"{}/{}/{}",
					config.download_base_url.trim_end_matches('/'),
					rule.folder,
					file_name
				),
				machine: rule.machine.clone(),
				release_type: rule.release_type.clone(),
				version: version::extract_version(file_name),
				modified_at: DateTime::<Utc>::from(
					metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
				),
				filesize: metadata.len(),
				checksum,
				path,
			});
		}
	}

	info!("Catalog scan found {} artifacts", entries.len());

	entries
}
