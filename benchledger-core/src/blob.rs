//! Best-effort integrity check of stored artifacts.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Read size for hashing; bounds memory regardless of blob size.
pub const HASH_CHUNK_SIZE: usize = 1024 * 1024;

/// Lowercase hex SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> io::Result<String> {
	let mut file = File::open(path)?;
	let mut hasher = Sha256::new();
	let mut buf = vec![0u8; HASH_CHUNK_SIZE];
	loop {
		let n = file.read(&mut buf)?;
		if n == 0 {
			break;
		}
		hasher.update(&buf[..n]);
	}
	Ok(hex::encode(hasher.finalize()))
}

/// Locate a blob: the path as recorded, then relative to the run file's
/// directory. Only these two places are tried.
pub fn resolve_blob_path(storage_path: &str, source_dir: Option<&Path>) -> Option<PathBuf> {
	let given = PathBuf::from(storage_path);
	if given.is_file() {
		return Some(given);
	}
	if given.is_absolute() {
		return None;
	}
	source_dir.map(|dir| dir.join(&given)).filter(|p| p.is_file())
}

/// Outcome counts of a blob verification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlobTally {
	/// Digest matched.
	pub ok: usize,
	/// Digest differed.
	pub bad: usize,
	/// File missing or unreadable.
	pub skipped: usize,
}

impl BlobTally {
	/// Verify one blob. Missing or unreadable files are skipped, not bad.
	pub fn check(&mut self, storage_path: &str, expected_hex: &str, source_dir: Option<&Path>) {
		let Some(path) = resolve_blob_path(storage_path, source_dir) else {
			self.skipped += 1;
			return;
		};
		match sha256_file(&path) {
			Ok(got) if got.eq_ignore_ascii_case(expected_hex.trim()) => self.ok += 1,
			Ok(_) => self.bad += 1,
			Err(e) => {
				tracing::debug!(path = %path.display(), error = %e, "blob unreadable, skipping");
				self.skipped += 1;
			}
		}
	}
}
