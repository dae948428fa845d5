use crate::error::FileIOError;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

const DEFAULT_REPO_TOOL: &str = "/usr/bin/repo-add";

/// Binds a source subfolder to the machine and release-type tags reported
/// for every artifact found inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRule {
	pub folder: String,
	pub release_type: String,
	pub machine: String,
}

/// Maps an opaque upload key to the subfolder it is allowed to write into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadKey {
	pub subfolder: String,
	pub key: String,
}

/// Process configuration, loaded once at startup from a JSON file and
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	/// Directory tree served and scanned; all other paths are relative to it
	pub root_folder: PathBuf,
	/// Base of the externally reachable download URLs in the catalog
	pub download_base_url: String,
	#[serde(default = "default_port")]
	pub port: u16,
	/// Serve everything below this path segment when running behind a
	/// reverse proxy
	#[serde(default)]
	pub proxy_prefix: Option<String>,
	#[serde(default)]
	pub repo_tool: Option<PathBuf>,
	#[serde(default)]
	pub upload_config: Vec<UploadKey>,
	#[serde(default)]
	pub api_config: Vec<ScanRule>,
}

fn default_port() -> u16 {
	9696
}

impl Config {
	pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();

		let bytes = fs::read(path)
			.await
			.map_err(|e| FileIOError::from((path, e, "Failed to read config file")))?;

		Ok(serde_json::from_slice(&bytes)?)
	}

	/// Linear lookup of the presented upload key; `None` means the request
	/// is not authorized.
	pub fn authorize_upload(&self, key: &str) -> Option<&UploadKey> {
		self.upload_config.iter().find(|entry| entry.key == key)
	}

	pub fn repo_tool(&self) -> &Path {
		self.repo_tool
			.as_deref()
			.unwrap_or(Path::new(DEFAULT_REPO_TOOL))
	}
}

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	FileIO(#[from] FileIOError),
}
