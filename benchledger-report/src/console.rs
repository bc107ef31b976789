//! Console rendering of grouped results.

use benchledger_core::GroupedMetrics;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

fn num(v: f64, decimals: usize) -> String {
	if v.is_nan() { "-".to_string() } else { format!("{v:.decimals$}") }
}

/// Grouped results as a terminal table; NaN shows as `-`.
pub fn grouped_table(grouped: &[GroupedMetrics]) -> Table {
	let mut table = Table::new();
	table
		.load_preset(UTF8_FULL)
		.set_content_arrangement(ContentArrangement::Dynamic)
		.set_header(vec![
			"experiment_group",
			"mode",
			"workers",
			"is_merkle",
			"merkle_batch_size",
			"tps_mean",
			"total_p95_mean",
			"ledger_tx_per_req_mean",
			"n_runs",
			"validation_ok_all",
		]);
	for g in grouped {
		let k = &g.key;
		table.add_row(vec![
			Cell::new(&k.experiment_group),
			Cell::new(&k.mode),
			Cell::new(k.workers),
			Cell::new(k.is_merkle),
			Cell::new(k.merkle_batch_size),
			Cell::new(num(g.tps.mean, 2)),
			Cell::new(num(g.total_p95.mean, 4)),
			Cell::new(num(g.ledger_tx_per_req.mean, 3)),
			Cell::new(g.n_runs),
			Cell::new(g.validation_ok_all),
		]);
	}
	table
}
