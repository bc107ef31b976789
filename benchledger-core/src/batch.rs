//! Multi-file driver: discover run files, reduce each independently, then
//! aggregate.
//!
//! Files share no state, so they are reduced on a rayon pool and collected
//! back in input order. An unparseable file yields one failing diagnostic and
//! is kept out of aggregation; it never aborts the batch.

use crate::aggregate::{aggregate, GroupedMetrics};
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::loader;
use crate::reduce::{reduce, RunMetrics};
use crate::validate::Validation;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Result of processing one run file.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
	/// Loaded and reduced; takes part in aggregation.
	Reduced(RunMetrics),
	/// Could not be loaded; reported but not aggregated.
	Unparseable(RunMetrics),
}

impl RunOutcome {
	/// Metrics of either variant.
	pub fn metrics(&self) -> &RunMetrics {
		match self {
			Self::Reduced(m) | Self::Unparseable(m) => m,
		}
	}

	/// The file could not be loaded.
	pub fn is_unparseable(&self) -> bool { matches!(self, Self::Unparseable(_)) }
}

/// Everything one `analyze` pass produces.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
	/// One per input file, in input order.
	pub outcomes: Vec<RunOutcome>,
	/// Aggregates of the loaded runs.
	pub grouped: Vec<GroupedMetrics>,
}

impl BatchReport {
	/// Per-run summaries in input order, unparseable files included.
	pub fn runs(&self) -> Vec<RunMetrics> { self.outcomes.iter().map(|o| o.metrics().clone()).collect() }

	/// Files whose validation failed, unparseable ones included.
	pub fn failures(&self) -> usize { self.outcomes.iter().filter(|o| !o.metrics().validation_ok).count() }

	/// Files that could not be loaded.
	pub fn unparseable(&self) -> usize { self.outcomes.iter().filter(|o| o.is_unparseable()).count() }
}

/// True for files this tool writes itself.
fn is_own_output(path: &Path) -> bool {
	let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
	name.contains("summary_") || path.to_string_lossy().contains("_analysis")
}

fn has_csv_extension(path: &Path) -> bool {
	path.extension().map(|e| e.eq_ignore_ascii_case("csv")).unwrap_or(false)
}

/// A single `.csv` file, or every `.csv` below a directory, sorted.
pub fn discover_inputs(input: &Path) -> Result<Vec<PathBuf>> {
	let mut files = Vec::new();
	if input.is_file() && has_csv_extension(input) {
		files.push(input.to_path_buf());
	} else if input.is_dir() {
		for entry in WalkDir::new(input).follow_links(true) {
			// loops, dangling links and unreadable directories are skipped
			let entry = match entry {
				Ok(e) => e,
				Err(e) => {
					warn!(error = %e, "skipping unreadable entry");
					continue;
				}
			};
			if entry.file_type().is_file() && has_csv_extension(entry.path()) {
				files.push(entry.into_path());
			}
		}
	}
	files.retain(|p| !is_own_output(p));
	files.sort();
	if files.is_empty() {
		return Err(Error::NoInputs(input.to_path_buf()));
	}
	Ok(files)
}

/// Load and reduce one file; never fails.
pub fn process_file(path: &Path, cfg: &AnalysisConfig) -> RunOutcome {
	let outcome = match loader::load_csv(path) {
		Ok(table) => RunOutcome::Reduced(reduce(&table, cfg)),
		Err(e) => RunOutcome::Unparseable(RunMetrics::unparseable(
			path,
			Validation::failed(format!("failed to parse CSV: {e}")),
		)),
	};
	let m = outcome.metrics();
	if !m.validation_ok {
		warn!(file = %m.file, messages = %m.validation_joined(), "run failed validation");
	}
	outcome
}

/// Reduce `files` on a pool of `jobs` threads (rayon's default when `None`)
/// and aggregate the loaded runs.
pub fn analyze_files(files: &[PathBuf], cfg: &AnalysisConfig, jobs: Option<usize>) -> Result<BatchReport> {
	info!(files = files.len(), tolerance_sec = cfg.tolerance_sec, blob_sample = cfg.verify_blob_sample, "analyzing runs");
	let run_all = || files.par_iter().map(|p| process_file(p, cfg)).collect::<Vec<_>>();
	let outcomes = match jobs {
		Some(n) => rayon::ThreadPoolBuilder::new()
			.num_threads(n)
			.build()
			.map_err(|e| Error::Pool(e.to_string()))?
			.install(run_all),
		None => run_all(),
	};

	let loaded: Vec<RunMetrics> = outcomes
		.iter()
		.filter_map(|o| match o {
			RunOutcome::Reduced(m) => Some(m.clone()),
			RunOutcome::Unparseable(_) => None,
		})
		.collect();
	let report = BatchReport { grouped: aggregate(&loaded), outcomes };
	info!(
		runs = report.outcomes.len(),
		groups = report.grouped.len(),
		failed = report.failures(),
		unparseable = report.unparseable(),
		"analysis finished"
	);
	Ok(report)
}

/// [`discover_inputs`] followed by [`analyze_files`].
pub fn analyze_path(input: &Path, cfg: &AnalysisConfig, jobs: Option<usize>) -> Result<BatchReport> {
	let files = discover_inputs(input)?;
	analyze_files(&files, cfg, jobs)
}
