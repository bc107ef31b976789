//! Process-local counters in Prometheus text exposition format.

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use std::collections::HashMap;
use std::sync::Mutex;

pub(crate) static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);
static COUNTERS: Lazy<Mutex<HashMap<String, IntCounter>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Run files processed.
pub const FILES_TOTAL: &str = "benchledger_files_total";
/// Run files that failed validation.
pub const FILES_FAILED_TOTAL: &str = "benchledger_files_failed_total";
/// Run files that could not be loaded.
pub const FILES_UNPARSEABLE_TOTAL: &str = "benchledger_files_unparseable_total";
/// Request rows loaded.
pub const ROWS_TOTAL: &str = "benchledger_rows_total";

/// Increment a counter, creating and registering it on first use.
/// Names that Prometheus rejects are dropped with a debug log.
pub fn record_counter(name: &str, v: u64) {
	let Ok(mut map) = COUNTERS.lock() else {
		tracing::debug!(counter = name, "counter map poisoned");
		return;
	};
	if !map.contains_key(name) {
		let c = match IntCounter::new(name, format!("counter {name}")) {
			Ok(c) => c,
			Err(e) => {
				tracing::debug!(counter = name, error = %e, "invalid counter");
				return;
			}
		};
		if let Err(e) = REGISTRY.register(Box::new(c.clone())) {
			tracing::debug!(counter = name, error = %e, "counter registration failed");
		}
		map.insert(name.to_string(), c);
	}
	if let Some(ctr) = map.get(name) {
		ctr.inc_by(v);
	}
}

/// What one processed run file contributes to the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
	/// Rows loaded from the file.
	pub rows: u64,
	/// Validation failed.
	pub failed: bool,
	/// File could not be loaded.
	pub unparseable: bool,
}

/// Count one processed file.
pub fn record_run(run: RunCounters) {
	record_counter(FILES_TOTAL, 1);
	record_counter(ROWS_TOTAL, run.rows);
	if run.failed {
		record_counter(FILES_FAILED_TOTAL, 1);
	}
	if run.unparseable {
		record_counter(FILES_UNPARSEABLE_TOTAL, 1);
	}
}

/// Render every registered counter; empty when encoding fails.
pub fn dump_prometheus() -> String {
	let mut out = Vec::new();
	match TextEncoder::new().encode(&REGISTRY.gather(), &mut out) {
		Ok(()) => String::from_utf8(out).unwrap_or_default(),
		Err(e) => {
			tracing::debug!(error = %e, "prometheus encode failed");
			String::new()
		}
	}
}
