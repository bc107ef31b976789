//! Error type shared by the core crate.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Failures surfaced by loading, configuration and batch setup.
#[derive(Debug, Error)]
pub enum Error {
	/// Filesystem access.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// CSV decoding, including non-UTF-8 content.
	#[error("csv: {0}")]
	Csv(#[from] csv::Error),
	/// Input that decodes but is not a usable run table.
	#[error("unparseable table: {0}")]
	Table(String),
	/// Invalid configuration value or file.
	#[error("config: {0}")]
	Config(String),
	/// Nothing to analyze under the given path.
	#[error("no CSV files found under: {}", .0.display())]
	NoInputs(PathBuf),
	/// Worker pool could not be built.
	#[error("worker pool: {0}")]
	Pool(String),
}

impl Error {
	/// Build a [`Error::Table`].
	pub fn table(msg: impl Into<String>) -> Self { Self::Table(msg.into()) }
	/// Build a [`Error::Config`].
	pub fn config(msg: impl Into<String>) -> Self { Self::Config(msg.into()) }
}
