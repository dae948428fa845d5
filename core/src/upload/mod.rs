//! Upload ingestion pipeline: authentication, spooling, integrity
//! verification and the commit to the artifact tree.

pub mod error;
pub mod repo_tool;

use crate::error::FileIOError;
use error::UploadError;

use std::{
	collections::HashMap,
	io::{Seek, SeekFrom, Write},
	path::{Component, Path, PathBuf},
	sync::Arc,
};

use sha2::{Digest, Sha256};
use tempfile::SpooledTempFile;
use tokio::{
	fs,
	sync::{Mutex, OwnedMutexGuard},
	task,
};
use tracing::info;

/// Spool at most this much of an upload in memory before spilling to disk.
pub const MAX_SPOOL_MEMORY: usize = 32 * 1024 * 1024;

/// Transient staging state for one uploaded file field: the spooled payload
/// and the name the client gave it.
///
/// The integrity check needs a full pass over the bytes before they may be
/// kept, hence the spool. Dropping a `PendingUpload` releases the temporary
/// storage, whatever the outcome of the request.
pub struct PendingUpload {
	spool: SpooledTempFile,
	pub filename: String,
}

impl PendingUpload {
	pub fn new(filename: String) -> Self {
		Self {
			spool: SpooledTempFile::new(MAX_SPOOL_MEMORY),
			filename,
		}
	}

	/// Append a chunk of the incoming payload.
	pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
		Ok(self.spool.write_all(chunk)?)
	}

	/// Hex-encoded SHA-256 of the spooled payload.
	///
	/// Takes and returns `self` so the rewind and read can run on the
	/// blocking pool.
	pub async fn sha256(mut self) -> Result<(Self, String), UploadError> {
		task::spawn_blocking(move || {
			self.spool.seek(SeekFrom::Start(0))?;

			let mut hasher = Sha256::new();
			std::io::copy(&mut self.spool, &mut hasher)?;

			Ok((self, hex::encode(hasher.finalize())))
		})
		.await?
	}

	/// Copy the spooled bytes to `dest`, consuming the staging state. The
	/// parent directory must already exist.
	pub async fn persist_to(mut self, dest: &Path) -> Result<(), UploadError> {
		let dest = dest.to_path_buf();

		task::spawn_blocking(move || {
			self.spool.seek(SeekFrom::Start(0))?;

			let mut out = std::fs::File::create(&dest)
				.map_err(|e| FileIOError::from((&dest, e, "Failed to create destination file")))?;
			std::io::copy(&mut self.spool, &mut out)
				.map_err(|e| FileIOError::from((&dest, e, "Failed to write destination file")))?;

			Ok(())
		})
		.await?
	}
}

/// Verify the client-supplied SHA-256 against the spooled payload.
pub async fn verify_checksum(
	pending: PendingUpload,
	expected: &str,
) -> Result<PendingUpload, UploadError> {
	let (pending, actual) = pending.sha256().await?;

	if !actual.eq_ignore_ascii_case(expected) {
		return Err(UploadError::ChecksumMismatch {
			expected: expected.to_string(),
			actual,
		});
	}

	Ok(pending)
}

/// Strip a client-supplied folder down to its plain relative components.
/// `..`, roots and prefixes are dropped so the joined path cannot escape the
/// upload root.
fn clean_relative(raw: &str) -> PathBuf {
	Path::new(raw)
		.components()
		.filter_map(|component| match component {
			Component::Normal(part) => Some(part),
			_ => None,
		})
		.collect()
}

/// Resolve the final destination for an uploaded file: upload root, the
/// key's authorized subfolder, the client-chosen folder and the original
/// filename, with every client-controlled segment path-cleaned.
///
/// The filename must be a bare name; anything carrying separators or parent
/// components is rejected.
pub fn resolve_destination(
	root: &Path,
	authorized_subfolder: &str,
	client_folder: &str,
	filename: &str,
) -> Result<PathBuf, UploadError> {
	let mut parts = Path::new(filename).components();
	if !matches!(
		(parts.next(), parts.next()),
		(Some(Component::Normal(_)), None)
	) {
		return Err(UploadError::PathEscape(filename.to_string()));
	}

	Ok(root
		.join(clean_relative(authorized_subfolder))
		.join(clean_relative(client_folder))
		.join(filename))
}

/// Serializes mutations per destination path, so the overwrite-policy check
/// and the write behind it cannot interleave across concurrent uploads to
/// the same file.
#[derive(Debug, Default)]
pub struct PathLocks {
	inner: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl PathLocks {
	// The map keeps one tiny entry per distinct destination path ever
	// uploaded to in this process lifetime
	pub async fn acquire(&self, path: &Path) -> OwnedMutexGuard<()> {
		let lock = {
			let mut map = self.inner.lock().await;
			map.entry(path.to_path_buf()).or_default().clone()
		};

		lock.lock_owned().await
	}
}

/// Enforce the overwrite policy and persist `pending` at `dest`.
///
/// An existing destination fails the request unless `allow_replace` is set,
/// in which case the old file is removed first. Missing directories are
/// created before the copy. The whole sequence runs under the
/// per-destination lock.
pub async fn commit(
	locks: &PathLocks,
	pending: PendingUpload,
	dest: &Path,
	allow_replace: bool,
) -> Result<(), UploadError> {
	let _guard = locks.acquire(dest).await;

	match fs::metadata(dest).await {
		Ok(_) => {
			if !allow_replace {
				return Err(UploadError::AlreadyExists(dest.to_path_buf()));
			}
			fs::remove_file(dest)
				.await
				.map_err(|e| FileIOError::from((dest, e, "Failed to remove replaced file")))?;
		}
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
		Err(e) => {
			return Err(FileIOError::from((dest, e, "Failed to stat destination")).into());
		}
	}

	if let Some(parent) = dest.parent() {
		fs::create_dir_all(parent)
			.await
			.map_err(|e| FileIOError::from((parent, e, "Failed to create destination folder")))?;
	}

	info!("Saving upload to {}", dest.display());

	pending.persist_to(dest).await
}
