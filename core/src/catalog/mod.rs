//! Release catalog: scanning, hashing, version extraction and the shared
//! store serving the read side.

pub mod checksum;
pub mod rebuilder;
pub mod scanner;
pub mod store;
pub mod version;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One discovered release artifact.
///
/// Entries are created fresh by a scan and discarded wholesale when the next
/// scan completes; they are never mutated in place.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
	/// Absolute location on disk. Not exposed to API consumers.
	#[serde(skip)]
	pub path: PathBuf,
	#[serde(rename = "url")]
	pub download_url: String,
	pub machine: String,
	pub release_type: String,
	pub version: String,
	#[serde(rename = "release_date")]
	pub modified_at: DateTime<Utc>,
	pub filesize: u64,
	/// Empty when the digest could not be computed; omitted from JSON then
	#[serde(rename = "hash_blake3", skip_serializing_if = "String::is_empty")]
	pub checksum: String,
}
