#![forbid(unsafe_code)]
//! Logging initialisation and run counters.

pub mod metrics;

pub use metrics::{dump_prometheus, record_counter, record_run, RunCounters};

use tracing_subscriber::EnvFilter;

/// Logging setup failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
	/// Invalid filter directive.
	#[error("telemetry init failed: {0}")]
	Init(String),
}
/// Result of logging setup.
pub type Result<T> = std::result::Result<T, Error>;

/// Subscriber options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	/// Default filter directive when `RUST_LOG` is unset.
	pub level: String,
	/// Print the event target module.
	pub with_target: bool,
}

impl Default for Config {
	fn default() -> Self { Self { level: "info".into(), with_target: false } }
}

/// Install the global fmt subscriber on stderr. `RUST_LOG` wins over
/// `cfg.level`. Returns `Ok(false)` when a subscriber was already installed.
pub fn init(cfg: &Config) -> Result<bool> {
	let filter = match std::env::var("RUST_LOG") {
		Ok(v) if !v.trim().is_empty() => EnvFilter::try_new(v),
		_ => EnvFilter::try_new(&cfg.level),
	}
	.map_err(|e| Error::Init(format!("invalid log filter: {e}")))?;
	let installed = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(cfg.with_target)
		.with_writer(std::io::stderr)
		.try_init()
		.is_ok();
	Ok(installed)
}

/// Shorthand for [`init`] with only a level.
pub fn init_logging(level: &str) -> Result<bool> {
	init(&Config { level: level.to_string(), ..Config::default() })
}
