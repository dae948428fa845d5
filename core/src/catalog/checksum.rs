use std::path::Path;

use blake3::Hasher;
use tokio::{
	fs::File,
	io::{self, AsyncReadExt},
};

const BLOCK_LEN: usize = 1_048_576;

/// Streaming blake3 digest of a file, lowercase hex encoded.
///
/// Reads in fixed-size blocks so multi-gigabyte artifacts never get buffered
/// whole in memory.
pub async fn file_checksum(path: impl AsRef<Path>) -> Result<String, io::Error> {
	let mut reader = File::open(path).await?;
	let mut hasher = Hasher::new();
	let mut buffer = vec![0; BLOCK_LEN].into_boxed_slice();

	loop {
		let read_count = reader.read(&mut buffer).await?;
		hasher.update(&buffer[..read_count]);
		if read_count != BLOCK_LEN {
			break;
		}
	}

	Ok(hasher.finalize().to_hex().to_string())
}
