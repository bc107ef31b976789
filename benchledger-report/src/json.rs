//! `summary.json`: runs and groups in one document. NaN becomes `null`.

use crate::Result;
use benchledger_core::{BatchReport, GroupedMetrics, RunMetrics};
use serde::Serialize;
use std::path::Path;

/// Document root of `summary.json`.
#[derive(Debug, Serialize)]
pub struct Summary<'a> {
	/// Runs that failed validation.
	pub failures: usize,
	/// Runs that could not be loaded.
	pub unparseable: usize,
	/// Per-run metrics in input order.
	pub runs: Vec<RunMetrics>,
	/// Group aggregates in presentation order.
	pub grouped: &'a [GroupedMetrics],
}

impl<'a> Summary<'a> {
	/// Borrow a batch report.
	pub fn of(report: &'a BatchReport) -> Self {
		Self {
			failures: report.failures(),
			unparseable: report.unparseable(),
			runs: report.runs(),
			grouped: &report.grouped,
		}
	}
}

/// Pretty-printed summary.
pub fn summary_string(report: &BatchReport) -> Result<String> {
	Ok(serde_json::to_string_pretty(&Summary::of(report))?)
}

/// Write [`summary_string`] to `path`.
pub fn write_summary(path: &Path, report: &BatchReport) -> Result<()> {
	std::fs::write(path, summary_string(report)?)?;
	Ok(())
}
