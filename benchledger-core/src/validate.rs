//! Run validation.
//!
//! Checks run in a fixed order and every check appends its messages in that
//! order: counts, negative durations, stage sum vs total, baseline ledger
//! activity, request status, blob integrity. Only an unparseable file
//! short-circuits.

use crate::blob::BlobTally;
use crate::config::AnalysisConfig;
use crate::loader;
use crate::types::{DurationField, RunTable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Negative durations down to this value are floating-point noise.
pub const NEGATIVE_EPSILON_SEC: f64 = -1e-12;

/// Examples of error text quoted in the status message.
const MAX_EXAMPLE_ERRORS: usize = 3;

/// Pass/fail verdict plus ordered diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
	/// No check failed.
	pub ok: bool,
	/// Counts first, then one entry per finding.
	pub messages: Vec<String>,
}

impl Validation {
	/// Failing verdict with a single message.
	pub fn failed(msg: impl Into<String>) -> Self { Self { ok: false, messages: vec![msg.into()] } }

	/// Messages joined for single-cell reporting.
	pub fn joined(&self) -> String { self.messages.join(" | ") }

	fn fail(&mut self, msg: String) {
		self.ok = false;
		self.messages.push(msg);
	}
}

/// Load `path` and validate it; a load failure becomes a single failing message.
pub fn validate_csv(path: impl AsRef<Path>, cfg: &AnalysisConfig) -> Validation {
	match loader::load_csv(path) {
		Ok(table) => validate(&table, cfg),
		Err(e) => Validation::failed(format!("failed to parse CSV: {e}")),
	}
}

/// Run every check against an already loaded table.
pub fn validate(table: &RunTable, cfg: &AnalysisConfig) -> Validation {
	if table.is_empty() {
		return Validation::failed("empty CSV");
	}
	let mut v = Validation { ok: true, messages: Vec::new() };
	v.messages.push(format!(
		"rows_total={} warmup={} main={}",
		table.rows_total(),
		table.rows_warmup(),
		table.rows_main()
	));

	check_negative_durations(table, &mut v);
	check_stage_sum(table, cfg.tolerance_sec, &mut v);
	check_baseline_ledger(table, &mut v);
	check_status(table, &mut v);
	if cfg.verify_blob_sample > 0 {
		check_blobs(table, cfg.verify_blob_sample, &mut v);
	}
	v
}

fn check_negative_durations(table: &RunTable, v: &mut Validation) {
	let offenders: Vec<String> = DurationField::ALL
		.iter()
		.filter_map(|f| {
			let n = table.rows.iter().filter(|r| r.durations.get(*f) < NEGATIVE_EPSILON_SEC).count();
			(n > 0).then(|| format!("{}: {n}", f.column()))
		})
		.collect();
	if !offenders.is_empty() {
		v.fail(format!("negative_durations={{{}}}", offenders.join(", ")));
	}
}

fn check_stage_sum(table: &RunTable, tolerance_sec: f64, v: &mut Validation) {
	let max_abs = table
		.main_rows()
		.map(|r| (r.durations.stage_sum() - r.durations.total_sec).abs())
		.fold(0.0f64, f64::max);
	if max_abs > tolerance_sec {
		v.fail(format!("stage_sum_minus_total_max_abs={max_abs:.6}s (eps={tolerance_sec:.3}s)"));
	}
}

fn check_baseline_ledger(table: &RunTable, v: &mut Validation) {
	debug!(mode = table.mode(), merkle = table.has_merkle_activity(), "mode/ledger consistency");
	if !table.is_baseline() {
		return;
	}
	let tx = table.rows.iter().filter(|r| r.has_tx_id()).count();
	if tx != 0 {
		v.fail(format!("baseline_expected_no_tx_id_but_found={tx}"));
	}
	let roots = table.rows.iter().filter(|r| r.has_merkle_root()).count();
	if roots != 0 {
		v.fail(format!("baseline_expected_no_merkle_root_but_found={roots}"));
	}
}

fn check_status(table: &RunTable, v: &mut Validation) {
	let bad: Vec<&str> = table.main_rows().filter(|r| !r.status_ok()).map(|r| r.error.as_str()).collect();
	if bad.is_empty() {
		return;
	}
	v.fail(format!("non_ok_status_main_rows={}", bad.len()));
	let examples: Vec<&str> = bad.into_iter().take(MAX_EXAMPLE_ERRORS).collect();
	v.messages.push(format!("example_errors={}", examples.join("; ")));
}

fn check_blobs(table: &RunTable, sample: usize, v: &mut Validation) {
	let mut tally = BlobTally::default();
	let source_dir = table.source_dir();
	for r in table
		.main_rows()
		.filter(|r| !r.storage_path.is_empty() && !r.doc_hash_hex.is_empty())
		.take(sample)
	{
		tally.check(&r.storage_path, &r.doc_hash_hex, source_dir);
	}
	let msg = format!(
		"blob_hash_verify_ok={} bad={} skipped={} (sample={sample})",
		tally.ok, tally.bad, tally.skipped
	);
	if tally.bad > 0 {
		v.fail(msg);
	} else {
		v.messages.push(msg);
	}
}
