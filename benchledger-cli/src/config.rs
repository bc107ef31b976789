//! Effective configuration: defaults, then a TOML file, then `BENCHLEDGER_*`
//! environment variables. Command-line flags are applied by the caller.

use anyhow::{bail, Context};
use benchledger_core::BenchConfig;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "benchledger.toml";

/// File to load: `--config`, else `$BENCHLEDGER_CONFIG`, else
/// `./benchledger.toml` when present.
fn config_path(explicit: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
	if let Some(p) = explicit {
		if !p.is_file() { bail!("config file not found: {}", p.display()); }
		return Ok(Some(p.to_path_buf()));
	}
	if let Ok(p) = std::env::var("BENCHLEDGER_CONFIG") {
		let p = p.trim();
		if !p.is_empty() {
			let p = PathBuf::from(p);
			if !p.is_file() { bail!("BENCHLEDGER_CONFIG points to a missing file: {}", p.display()); }
			return Ok(Some(p));
		}
	}
	let local = PathBuf::from(DEFAULT_CONFIG_FILE);
	Ok(local.is_file().then_some(local))
}

/// Returns the configuration and the file it was read from, if any.
pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<(BenchConfig, Option<PathBuf>)> {
	let path = config_path(explicit)?;
	let mut cfg = match &path {
		Some(p) => BenchConfig::load_from_file(p).with_context(|| format!("loading {}", p.display()))?,
		None => BenchConfig::default(),
	};
	cfg.apply_env().context("applying BENCHLEDGER_* environment")?;
	Ok((cfg, path))
}

pub const TEMPLATE_TOML: &str = r#"# benchledger configuration (template)

# trace | debug | info | warn | error; RUST_LOG overrides it
log_level = "info"

[analysis]
# Allowed |hash+storage+db+ledger+merkle_wait - total| per main row, seconds
tolerance_sec = 0.05
# Re-hash the stored blob of the first N main rows that record one; 0 disables
verify_blob_sample = 0
"#;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn template_parses_to_defaults() {
		let cfg: BenchConfig = toml::from_str(TEMPLATE_TOML).unwrap();
		assert_eq!(cfg, BenchConfig::default());
	}

	#[test]
	fn explicit_missing_file_is_an_error() {
		assert!(config_path(Some(Path::new("/definitely/not/here.toml"))).is_err());
	}
}
