//! `summary_runs.csv` and `summary_grouped.csv`.

use crate::Result;
use benchledger_core::{GroupedMetrics, RunMetrics};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Flat per-run row; undefined values are written as `NaN`.
#[allow(missing_docs)] // fields are the column names
#[derive(Debug, Serialize)]
pub struct RunRow<'a> {
	pub file: &'a str,
	pub experiment_id: &'a str,
	pub experiment_group: &'a str,
	pub mode: &'a str,
	pub workers: u32,
	pub is_merkle: bool,
	pub merkle_batch_size: u32,
	pub rows_total: usize,
	pub rows_warmup: usize,
	pub rows_main: usize,
	pub wall_sec: f64,
	pub tps: f64,
	pub total_mean_sec: f64,
	pub total_p50_sec: f64,
	pub total_p95_sec: f64,
	pub total_p99_sec: f64,
	pub ledger_mean_sec: f64,
	pub ledger_p50_sec: f64,
	pub ledger_p95_sec: f64,
	pub ledger_p99_sec: f64,
	pub merkle_wait_mean_sec: f64,
	pub merkle_wait_p50_sec: f64,
	pub merkle_wait_p95_sec: f64,
	pub merkle_wait_p99_sec: f64,
	pub ledger_tx: usize,
	pub ledger_tx_per_req: f64,
	pub validation_ok: bool,
	pub validation_messages: String,
}

impl<'a> From<&'a RunMetrics> for RunRow<'a> {
	fn from(m: &'a RunMetrics) -> Self {
		Self {
			file: &m.file,
			experiment_id: &m.experiment_id,
			experiment_group: &m.experiment_group,
			mode: &m.mode,
			workers: m.workers,
			is_merkle: m.is_merkle,
			merkle_batch_size: m.merkle_batch_size,
			rows_total: m.rows_total,
			rows_warmup: m.rows_warmup,
			rows_main: m.rows_main,
			wall_sec: m.wall_sec,
			tps: m.tps,
			total_mean_sec: m.total.mean,
			total_p50_sec: m.total.p50,
			total_p95_sec: m.total.p95,
			total_p99_sec: m.total.p99,
			ledger_mean_sec: m.ledger.mean,
			ledger_p50_sec: m.ledger.p50,
			ledger_p95_sec: m.ledger.p95,
			ledger_p99_sec: m.ledger.p99,
			merkle_wait_mean_sec: m.merkle_wait.mean,
			merkle_wait_p50_sec: m.merkle_wait.p50,
			merkle_wait_p95_sec: m.merkle_wait.p95,
			merkle_wait_p99_sec: m.merkle_wait.p99,
			ledger_tx: m.ledger_tx,
			ledger_tx_per_req: m.ledger_tx_per_req,
			validation_ok: m.validation_ok,
			validation_messages: m.validation_joined(),
		}
	}
}

/// Flat per-group row.
#[allow(missing_docs)]
#[derive(Debug, Serialize)]
pub struct GroupRow<'a> {
	pub experiment_group: &'a str,
	pub mode: &'a str,
	pub workers: u32,
	pub is_merkle: bool,
	pub merkle_batch_size: u32,
	pub tps_mean: f64,
	pub tps_std: f64,
	pub total_p95_mean: f64,
	pub total_p95_std: f64,
	pub total_p99_mean: f64,
	pub total_p99_std: f64,
	pub ledger_tx_per_req_mean: f64,
	pub ledger_tx_per_req_std: f64,
	pub merkle_wait_p95_mean: f64,
	pub merkle_wait_p95_std: f64,
	pub n_runs: usize,
	pub validation_ok_all: bool,
}

impl<'a> From<&'a GroupedMetrics> for GroupRow<'a> {
	fn from(g: &'a GroupedMetrics) -> Self {
		Self {
			experiment_group: &g.key.experiment_group,
			mode: &g.key.mode,
			workers: g.key.workers,
			is_merkle: g.key.is_merkle,
			merkle_batch_size: g.key.merkle_batch_size,
			tps_mean: g.tps.mean,
			tps_std: g.tps.std,
			total_p95_mean: g.total_p95.mean,
			total_p95_std: g.total_p95.std,
			total_p99_mean: g.total_p99.mean,
			total_p99_std: g.total_p99.std,
			ledger_tx_per_req_mean: g.ledger_tx_per_req.mean,
			ledger_tx_per_req_std: g.ledger_tx_per_req.std,
			merkle_wait_p95_mean: g.merkle_wait_p95.mean,
			merkle_wait_p95_std: g.merkle_wait_p95.std,
			n_runs: g.n_runs,
			validation_ok_all: g.validation_ok_all,
		}
	}
}

/// Write the per-run table, header included.
pub fn runs_csv<W: Write>(out: W, runs: &[RunMetrics]) -> Result<()> {
	let mut w = csv::Writer::from_writer(out);
	for m in runs {
		w.serialize(RunRow::from(m))?;
	}
	w.flush()?;
	Ok(())
}

/// Write the grouped table, header included.
pub fn grouped_csv<W: Write>(out: W, grouped: &[GroupedMetrics]) -> Result<()> {
	let mut w = csv::Writer::from_writer(out);
	for g in grouped {
		w.serialize(GroupRow::from(g))?;
	}
	w.flush()?;
	Ok(())
}

/// [`runs_csv`] into a file.
pub fn write_runs_csv(path: &Path, runs: &[RunMetrics]) -> Result<()> {
	runs_csv(std::fs::File::create(path)?, runs)
}

/// [`grouped_csv`] into a file.
pub fn write_grouped_csv(path: &Path, grouped: &[GroupedMetrics]) -> Result<()> {
	grouped_csv(std::fs::File::create(path)?, grouped)
}
