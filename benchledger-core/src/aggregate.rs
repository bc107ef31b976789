//! Grouping of repeated runs by experiment configuration.

use crate::reduce::RunMetrics;
use crate::stats::MeanStd;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity of an experiment configuration.
///
/// Field order is the presentation order: mode, merkle flag, batch size,
/// workers, group name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
	/// Run mode.
	pub mode: String,
	/// Merkle runs sort after plain runs of the same mode.
	pub is_merkle: bool,
	/// Batch size; 0 for non-merkle runs.
	pub merkle_batch_size: u32,
	/// Concurrent client workers.
	pub workers: u32,
	/// Experiment id without the repeat suffix.
	pub experiment_group: String,
}

impl GroupKey {
	/// Key of one reduced run.
	pub fn of(run: &RunMetrics) -> Self {
		Self {
			mode: run.mode.clone(),
			is_merkle: run.is_merkle,
			merkle_batch_size: run.merkle_batch_size,
			workers: run.workers,
			experiment_group: run.experiment_group.clone(),
		}
	}
}

/// Mean/std across the repeats of one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedMetrics {
	/// Configuration shared by every member.
	pub key: GroupKey,
	/// Throughput across repeats.
	pub tps: MeanStd,
	/// p95 end-to-end latency across repeats.
	pub total_p95: MeanStd,
	/// p99 end-to-end latency across repeats.
	pub total_p99: MeanStd,
	/// Ledger transactions per request across repeats.
	pub ledger_tx_per_req: MeanStd,
	/// p95 merkle queueing latency across repeats.
	pub merkle_wait_p95: MeanStd,
	/// Member runs, NaN values included.
	pub n_runs: usize,
	/// Every member passed validation.
	pub validation_ok_all: bool,
}

impl GroupedMetrics {
	fn from_members(key: GroupKey, members: &[&RunMetrics]) -> Self {
		let stat = |f: fn(&RunMetrics) -> f64| MeanStd::of(members.iter().map(|m| f(m)));
		Self {
			tps: stat(|m| m.tps),
			total_p95: stat(|m| m.total.p95),
			total_p99: stat(|m| m.total.p99),
			ledger_tx_per_req: stat(|m| m.ledger_tx_per_req),
			merkle_wait_p95: stat(|m| m.merkle_wait.p95),
			n_runs: members.len(),
			validation_ok_all: members.iter().all(|m| m.validation_ok),
			key,
		}
	}
}

/// One row per distinct configuration, sorted by [`GroupKey`].
pub fn aggregate(runs: &[RunMetrics]) -> Vec<GroupedMetrics> {
	let mut groups: BTreeMap<GroupKey, Vec<&RunMetrics>> = BTreeMap::new();
	for run in runs {
		groups.entry(GroupKey::of(run)).or_default().push(run);
	}
	groups.into_iter().map(|(key, members)| GroupedMetrics::from_members(key, &members)).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::stats::LatencySummary;

	fn run(group: &str, mode: &str, workers: u32, merkle: bool, batch: u32, tps: f64) -> RunMetrics {
		let lat = LatencySummary { mean: 0.1, p50: 0.1, p95: 0.2, p99: 0.3 };
		RunMetrics {
			file: format!("{group}.csv"),
			experiment_id: group.into(),
			experiment_group: group.into(),
			mode: mode.into(),
			workers,
			is_merkle: merkle,
			merkle_batch_size: batch,
			rows_total: 10,
			rows_warmup: 0,
			rows_main: 10,
			wall_sec: 1.0,
			tps,
			total: lat,
			ledger: lat,
			merkle_wait: LatencySummary::UNDEFINED,
			ledger_tx: 10,
			ledger_tx_per_req: 1.0,
			validation_ok: true,
			validation_messages: Vec::new(),
		}
	}

	#[test]
	fn single_run_group_has_exact_means_and_undefined_std() {
		let r = run("exp", "ledger", 8, false, 0, 123.456);
		let g = aggregate(std::slice::from_ref(&r));
		assert_eq!(g.len(), 1);
		assert_eq!(g[0].n_runs, 1);
		assert_eq!(g[0].tps.mean, r.tps);
		assert_eq!(g[0].total_p95.mean, r.total.p95);
		assert_eq!(g[0].total_p99.mean, r.total.p99);
		assert_eq!(g[0].ledger_tx_per_req.mean, r.ledger_tx_per_req);
		assert!(g[0].tps.std.is_nan());
		assert!(g[0].total_p95.std.is_nan());
		assert!(g[0].merkle_wait_p95.mean.is_nan());
	}

	#[test]
	fn repeats_share_a_group() {
		let mut a = run("exp_a", "ledger", 8, false, 0, 100.0);
		let mut b = run("exp_a", "ledger", 8, false, 0, 200.0);
		b.validation_ok = false;
		a.experiment_id = "exp_a_r01".into();
		b.experiment_id = "exp_a_r02".into();
		let g = aggregate(&[a, b]);
		assert_eq!(g.len(), 1);
		assert_eq!(g[0].n_runs, 2);
		assert_eq!(g[0].tps.mean, 150.0);
		assert!((g[0].tps.std - 70.710678118654755).abs() < 1e-9);
		assert!(!g[0].validation_ok_all);
	}

	#[test]
	fn merkle_flag_and_batch_size_split_groups() {
		let runs = [
			run("exp", "merkle", 8, true, 0, 1.0),
			run("exp", "merkle", 8, false, 0, 1.0),
			run("exp", "merkle", 8, true, 16, 1.0),
		];
		assert_eq!(aggregate(&runs).len(), 3);
	}

	#[test]
	fn presentation_order() {
		let runs = [
			run("z", "merkle", 4, true, 32, 1.0),
			run("a", "merkle", 16, true, 8, 1.0),
			run("b", "baseline", 16, false, 0, 1.0),
			run("a", "baseline", 16, false, 0, 1.0),
			run("a", "baseline", 4, false, 0, 1.0),
			run("a", "merkle", 4, true, 8, 1.0),
		];
		let order: Vec<(String, u32, u32, String)> = aggregate(&runs)
			.into_iter()
			.map(|g| (g.key.mode, g.key.merkle_batch_size, g.key.workers, g.key.experiment_group))
			.collect();
		assert_eq!(
			order,
			vec![
				("baseline".into(), 0, 4, "a".into()),
				("baseline".into(), 0, 16, "a".into()),
				("baseline".into(), 0, 16, "b".into()),
				("merkle".into(), 8, 4, "a".into()),
				("merkle".into(), 8, 16, "a".into()),
				("merkle".into(), 32, 4, "z".into()),
			]
		);
	}

	#[test]
	fn undefined_member_values_are_skipped() {
		let a = run("exp", "ledger", 8, false, 0, f64::NAN);
		let b = run("exp", "ledger", 8, false, 0, 50.0);
		let g = aggregate(&[a, b]);
		assert_eq!(g[0].tps.mean, 50.0);
		assert!(g[0].tps.std.is_nan());
		assert_eq!(g[0].n_runs, 2);
	}

	#[test]
	fn empty_input_yields_no_groups() {
		assert!(aggregate(&[]).is_empty());
	}
}
