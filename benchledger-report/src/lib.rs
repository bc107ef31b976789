#![forbid(unsafe_code)]
//! Emitters for analysis results. They honour the numeric contract of
//! [`RunMetrics`] and [`GroupedMetrics`]; layout is theirs to choose.

pub mod console;
pub mod json;
pub mod latex;
pub mod tables;

use benchledger_core::{BatchReport, GroupedMetrics, RunMetrics};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result of report writers.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Failures while writing reports.
#[derive(Debug, Error)]
pub enum Error {
	/// Output file or directory.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// CSV encoding.
	#[error("csv: {0}")]
	Csv(#[from] csv::Error),
	/// JSON encoding.
	#[error("serde: {0}")]
	Serde(#[from] serde_json::Error),
}

/// One row per run file.
pub const RUNS_CSV: &str = "summary_runs.csv";
/// One row per experiment configuration.
pub const GROUPED_CSV: &str = "summary_grouped.csv";
/// Runs and groups as JSON.
pub const SUMMARY_JSON: &str = "summary.json";
/// LaTeX tabular of the groups.
pub const GROUPED_TEX: &str = "table_grouped.tex";

/// Files written by [`write_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
	/// `summary_runs.csv`.
	pub runs_csv: PathBuf,
	/// `summary_grouped.csv`.
	pub grouped_csv: PathBuf,
	/// `summary.json`.
	pub summary_json: PathBuf,
	/// `table_grouped.tex`.
	pub grouped_tex: PathBuf,
}

/// Write every file-based report for `report` into `out_dir`, creating it.
pub fn write_all(out_dir: &Path, report: &BatchReport) -> Result<ReportPaths> {
	std::fs::create_dir_all(out_dir)?;
	let runs: Vec<RunMetrics> = report.runs();
	let grouped: &[GroupedMetrics] = &report.grouped;
	let paths = ReportPaths {
		runs_csv: out_dir.join(RUNS_CSV),
		grouped_csv: out_dir.join(GROUPED_CSV),
		summary_json: out_dir.join(SUMMARY_JSON),
		grouped_tex: out_dir.join(GROUPED_TEX),
	};
	tables::write_runs_csv(&paths.runs_csv, &runs)?;
	tables::write_grouped_csv(&paths.grouped_csv, grouped)?;
	json::write_summary(&paths.summary_json, report)?;
	std::fs::write(&paths.grouped_tex, latex::grouped_table(grouped))?;
	tracing::info!(dir = %out_dir.display(), runs = runs.len(), groups = grouped.len(), "reports written");
	Ok(paths)
}
