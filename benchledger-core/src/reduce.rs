//! Reduction of one run table into a [`RunMetrics`] summary.

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::identity::{experiment_group, experiment_id};
use crate::loader;
use crate::stats::LatencySummary;
use crate::types::{RunRecord, RunTable};
use crate::validate::{validate, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Summary of one run file. Undefined statistics are NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
	/// Source path as given.
	pub file: String,
	/// File stem.
	pub experiment_id: String,
	/// Id without its repeat suffix.
	pub experiment_group: String,
	/// Mode of the first row.
	pub mode: String,
	/// Workers of the first row.
	pub workers: u32,
	/// Run committed merkle roots.
	pub is_merkle: bool,
	/// Largest batch size seen.
	pub merkle_batch_size: u32,
	/// All rows.
	pub rows_total: usize,
	/// Warmup rows.
	pub rows_warmup: usize,
	/// Rows that count toward metrics.
	pub rows_main: usize,
	/// First main-row start to last main-row end.
	pub wall_sec: f64,
	/// Main rows per wall second.
	pub tps: f64,
	/// End-to-end latency of main rows.
	pub total: LatencySummary,
	/// Ledger stage latency of main rows.
	pub ledger: LatencySummary,
	/// Merkle queueing latency of main rows.
	pub merkle_wait: LatencySummary,
	/// Distinct merkle roots for merkle runs, distinct tx ids otherwise.
	pub ledger_tx: usize,
	/// `ledger_tx / rows_main`; NaN without main rows.
	pub ledger_tx_per_req: f64,
	/// Verdict of the validator.
	pub validation_ok: bool,
	/// Validator diagnostics in check order.
	pub validation_messages: Vec<String>,
}

impl RunMetrics {
	/// Placeholder for a file that could not be loaded: no rows, undefined
	/// statistics, failed validation.
	pub fn unparseable(path: &Path, validation: Validation) -> Self {
		let id = experiment_id(path);
		Self {
			file: path.display().to_string(),
			experiment_group: experiment_group(&id),
			experiment_id: id,
			mode: String::new(),
			workers: 0,
			is_merkle: false,
			merkle_batch_size: 0,
			rows_total: 0,
			rows_warmup: 0,
			rows_main: 0,
			wall_sec: f64::NAN,
			tps: f64::NAN,
			total: LatencySummary::UNDEFINED,
			ledger: LatencySummary::UNDEFINED,
			merkle_wait: LatencySummary::UNDEFINED,
			ledger_tx: 0,
			ledger_tx_per_req: f64::NAN,
			validation_ok: validation.ok,
			validation_messages: validation.messages,
		}
	}

	/// Messages joined with ` | `.
	pub fn validation_joined(&self) -> String { self.validation_messages.join(" | ") }
}

/// Load `path` and reduce it.
pub fn reduce_csv(path: impl AsRef<Path>, cfg: &AnalysisConfig) -> Result<RunMetrics> {
	let table = loader::load_csv(path)?;
	Ok(reduce(&table, cfg))
}

/// Metrics for one loaded run; validation runs as part of it.
pub fn reduce(table: &RunTable, cfg: &AnalysisConfig) -> RunMetrics {
	let main: Vec<&RunRecord> = table.main_rows().collect();
	let rows_main = main.len();
	let is_merkle = table.is_merkle_run();

	let wall_sec = wall_seconds(&main);
	let tps = if wall_sec > 0.0 { rows_main as f64 / wall_sec } else { f64::NAN };

	let column = |f: fn(&RunRecord) -> f64| LatencySummary::from_samples(main.iter().map(|r| f(r)).collect());
	let total = column(|r| r.durations.total_sec);
	let ledger = column(|r| r.durations.ledger_sec);
	let merkle_wait = column(|r| r.durations.merkle_wait_sec);

	// one merkle root commits a whole batch; otherwise each tx id is a transaction
	let ledger_tx = if is_merkle {
		distinct_non_empty(main.iter().map(|r| r.merkle_root.as_str()))
	} else {
		distinct_non_empty(main.iter().map(|r| r.tx_id.as_str()))
	};
	let ledger_tx_per_req = if rows_main > 0 { ledger_tx as f64 / rows_main as f64 } else { f64::NAN };

	let validation = validate(table, cfg);
	let (file, id) = match &table.source {
		Some(p) => (p.display().to_string(), experiment_id(p)),
		None => (String::new(), String::new()),
	};

	RunMetrics {
		file,
		experiment_group: experiment_group(&id),
		experiment_id: id,
		mode: table.mode().to_string(),
		workers: table.workers(),
		is_merkle,
		merkle_batch_size: table.max_merkle_batch_size(),
		rows_total: table.rows_total(),
		rows_warmup: table.rows_warmup(),
		rows_main,
		wall_sec,
		tps,
		total,
		ledger,
		merkle_wait,
		ledger_tx,
		ledger_tx_per_req,
		validation_ok: validation.ok,
		validation_messages: validation.messages,
	}
}

/// Wall-clock span of the main rows from request timestamps. Summed
/// durations overcount when requests overlap.
fn wall_seconds(main: &[&RunRecord]) -> f64 {
	let max_start = main.iter().map(|r| r.req_start_unix_ns).max().unwrap_or(0);
	let max_end = main.iter().map(|r| r.req_end_unix_ns).max().unwrap_or(0);
	if max_start <= 0 || max_end <= 0 {
		return f64::NAN;
	}
	let min_start = main.iter().map(|r| r.req_start_unix_ns).min().unwrap_or(0);
	let span_ns = max_end.saturating_sub(min_start);
	(span_ns as f64 / 1e9).max(0.0)
}

fn distinct_non_empty<'a>(values: impl Iterator<Item = &'a str>) -> usize {
	values.filter(|s| !s.is_empty()).collect::<HashSet<_>>().len()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::Durations;

	const T0: i64 = 1_700_000_000_000_000_000;

	fn row(start_ms: i64, end_ms: i64) -> RunRecord {
		RunRecord {
			mode: "baseline".into(),
			workers: 4,
			status: "ok".into(),
			durations: Durations { total_sec: 0.1, hash_sec: 0.1, ..Durations::default() },
			req_start_unix_ns: T0 + start_ms * 1_000_000,
			req_end_unix_ns: T0 + end_ms * 1_000_000,
			..RunRecord::default()
		}
	}

	#[test]
	fn throughput_uses_timestamp_span() {
		let t = RunTable::new(vec![row(0, 400), row(300, 700), row(600, 1000)]);
		let m = reduce(&t, &AnalysisConfig::default());
		assert!((m.wall_sec - 1.0).abs() < 1e-9);
		assert!((m.tps - 3.0).abs() < 1e-9);
		assert_eq!(m.ledger_tx, 0);
		assert_eq!(m.ledger_tx_per_req, 0.0);
		assert!(m.validation_ok);
	}

	#[test]
	fn missing_timestamps_leave_throughput_undefined() {
		let mut r = row(0, 0);
		r.req_start_unix_ns = 0;
		r.req_end_unix_ns = 0;
		let m = reduce(&RunTable::new(vec![r]), &AnalysisConfig::default());
		assert!(m.wall_sec.is_nan());
		assert!(m.tps.is_nan());
	}

	#[test]
	fn zero_span_leaves_tps_undefined() {
		let m = reduce(&RunTable::new(vec![row(5, 5)]), &AnalysisConfig::default());
		assert_eq!(m.wall_sec, 0.0);
		assert!(m.tps.is_nan());
	}

	#[test]
	fn warmup_rows_are_excluded_from_statistics() {
		let mut warm = row(-5000, -4000);
		warm.is_warmup = true;
		warm.durations.total_sec = 100.0;
		let t = RunTable::new(vec![warm, row(0, 500), row(500, 1000)]);
		let m = reduce(&t, &AnalysisConfig::default());
		assert_eq!((m.rows_total, m.rows_warmup, m.rows_main), (3, 1, 2));
		assert!((m.wall_sec - 1.0).abs() < 1e-9);
		assert!((m.total.p99 - 0.1).abs() < 1e-12);
	}

	#[test]
	fn tx_ids_count_distinct_transactions() {
		let mut rows = Vec::new();
		for (i, tx) in ["a", "b", "b", ""].iter().enumerate() {
			let mut r = row(i as i64, i as i64 + 1);
			r.mode = "ledger".into();
			r.tx_id = tx.to_string();
			rows.push(r);
		}
		let m = reduce(&RunTable::new(rows), &AnalysisConfig::default());
		assert!(!m.is_merkle);
		assert_eq!(m.ledger_tx, 2);
		assert_eq!(m.ledger_tx_per_req, 0.5);
	}

	#[test]
	fn merkle_roots_count_batches() {
		let mut rows = Vec::new();
		for i in 0..6 {
			let mut r = row(i, i + 1);
			r.mode = "merkle".into();
			r.tx_id = format!("tx{i}");
			r.merkle_root = if i < 4 { "root-a".into() } else { "root-b".into() };
			r.merkle_batch_size = 4;
			rows.push(r);
		}
		let m = reduce(&RunTable::new(rows), &AnalysisConfig::default());
		assert!(m.is_merkle);
		assert_eq!(m.merkle_batch_size, 4);
		assert_eq!(m.ledger_tx, 2);
		assert!((m.ledger_tx_per_req - 2.0 / 6.0).abs() < 1e-12);
	}

	#[test]
	fn batch_size_alone_marks_merkle_mode() {
		let mut r = row(0, 1);
		r.mode = "merkle".into();
		r.merkle_batch_size = 16;
		r.tx_id = "tx".into();
		let m = reduce(&RunTable::new(vec![r]), &AnalysisConfig::default());
		assert!(m.is_merkle);
		assert_eq!(m.ledger_tx, 0);
	}

	#[test]
	fn all_warmup_run_is_undefined_not_a_crash() {
		let mut r = row(0, 1);
		r.is_warmup = true;
		let m = reduce(&RunTable::new(vec![r]), &AnalysisConfig::default());
		assert_eq!(m.rows_main, 0);
		assert!(m.ledger_tx_per_req.is_nan());
		assert!(m.total.mean.is_nan());
		assert!(m.wall_sec.is_nan());
	}

	#[test]
	fn failed_validation_is_recorded_not_raised() {
		let mut r = row(0, 1000);
		r.tx_id = "tx".into();
		let m = reduce(&RunTable::new(vec![r]), &AnalysisConfig::default());
		assert!(!m.validation_ok);
		assert!((m.tps - 1.0).abs() < 1e-9);
		assert!(m.validation_joined().contains("baseline_expected_no_tx_id_but_found=1"));
	}

	#[test]
	fn identity_comes_from_source_file() {
		let t = RunTable::new(vec![row(0, 1)]).with_source("/data/bench_w8_c2000_r01.csv");
		let m = reduce(&t, &AnalysisConfig::default());
		assert_eq!(m.experiment_id, "bench_w8_c2000_r01");
		assert_eq!(m.experiment_group, "bench_w8_c2000");
		assert_eq!(m.workers, 4);
		assert_eq!(m.mode, "baseline");
	}
}
