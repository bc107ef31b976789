//! Settings for validation and reduction, loaded from TOML and the environment.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Stage-sum vs total tolerance; absorbs clock jitter and rounding.
pub const DEFAULT_TOLERANCE_SEC: f64 = 0.050;

/// Knobs consumed by validation and reduction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
	/// Allowed |stage sum - total| per main row, seconds.
	pub tolerance_sec: f64,
	/// Number of main rows whose stored blob is re-hashed; 0 disables the check.
	pub verify_blob_sample: usize,
}

impl Default for AnalysisConfig {
	fn default() -> Self {
		Self { tolerance_sec: DEFAULT_TOLERANCE_SEC, verify_blob_sample: 0 }
	}
}

impl AnalysisConfig {
	/// Reject negative or non-finite tolerances.
	pub fn validate(&self) -> Result<()> {
		if !self.tolerance_sec.is_finite() || self.tolerance_sec < 0.0 {
			return Err(Error::config(format!("invalid tolerance_sec: {}", self.tolerance_sec)));
		}
		Ok(())
	}
}

/// Top-level `benchledger.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BenchConfig {
	/// One of `trace|debug|info|warn|error`.
	pub log_level: String,
	/// Validation and reduction settings.
	pub analysis: AnalysisConfig,
}

impl Default for BenchConfig {
	fn default() -> Self {
		Self { log_level: "info".into(), analysis: AnalysisConfig::default() }
	}
}

impl BenchConfig {
	/// Parse and validate a TOML file; absent keys keep their defaults.
	pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
		let data = fs::read_to_string(path)?;
		let cfg: Self = toml::from_str(&data).map_err(|e| Error::config(format!("toml parse error: {e}")))?;
		cfg.validate()?;
		Ok(cfg)
	}

	/// Overlay `BENCHLEDGER_*` environment variables onto `self`.
	pub fn apply_env(&mut self) -> Result<()> {
		if let Ok(v) = std::env::var("BENCHLEDGER_LOG_LEVEL") {
			let v = v.trim();
			if !v.is_empty() { self.log_level = v.to_ascii_lowercase(); }
		}
		if let Ok(v) = std::env::var("BENCHLEDGER_TOLERANCE_SEC") {
			self.analysis.tolerance_sec = v.trim().parse::<f64>()
				.map_err(|e| Error::config(format!("BENCHLEDGER_TOLERANCE_SEC: {e}")))?;
		}
		if let Ok(v) = std::env::var("BENCHLEDGER_VERIFY_BLOB_SAMPLE") {
			self.analysis.verify_blob_sample = v.trim().parse::<usize>()
				.map_err(|e| Error::config(format!("BENCHLEDGER_VERIFY_BLOB_SAMPLE: {e}")))?;
		}
		self.validate()
	}

	/// Check the log level, then the analysis settings.
	pub fn validate(&self) -> Result<()> {
		let allowed = ["trace", "debug", "info", "warn", "error"];
		if !allowed.contains(&self.log_level.as_str()) {
			return Err(Error::config(format!("invalid log_level: {}", self.log_level)));
		}
		self.analysis.validate()
	}
}
