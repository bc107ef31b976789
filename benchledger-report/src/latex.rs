//! LaTeX `tabular` of grouped results for inclusion in a paper.

use benchledger_core::GroupedMetrics;
use std::fmt::Write;

/// Undefined values render as zero; a table cell has no NaN.
fn or_zero(v: f64) -> f64 { if v.is_nan() { 0.0 } else { v } }

/// Escape underscores for LaTeX text mode.
pub fn escape(s: &str) -> String { s.replace('_', "\\_") }

/// `tabular` environment with one line per group.
pub fn grouped_table(grouped: &[GroupedMetrics]) -> String {
	let mut out = String::new();
	out.push_str("% Auto-generated by benchledger\n");
	out.push_str("% Columns: experiment, mode, workers, merkle, batch, TPS, p95 latency\n");
	out.push_str("\\begin{tabular}{l l r l r r r}\n");
	out.push_str("\\toprule\n");
	out.push_str("Experiment & Mode & W & Merkle & Batch & TPS (mean$\\pm$sd) & p95 latency [s] \\\\\n");
	out.push_str("\\midrule\n");
	for g in grouped {
		let k = &g.key;
		let batch = if k.is_merkle { k.merkle_batch_size } else { 0 };
		// writing to a String cannot fail
		let _ = writeln!(
			out,
			"{} & {} & {} & {} & {} & {:.2}$\\pm${:.2} & {:.3}$\\pm${:.3} \\\\",
			escape(&k.experiment_group),
			escape(&k.mode),
			k.workers,
			if k.is_merkle { "yes" } else { "no" },
			batch,
			or_zero(g.tps.mean),
			or_zero(g.tps.std),
			or_zero(g.total_p95.mean),
			or_zero(g.total_p95.std),
		);
	}
	out.push_str("\\bottomrule\n");
	out.push_str("\\end{tabular}\n");
	out
}
