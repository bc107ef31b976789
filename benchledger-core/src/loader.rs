//! CSV loading and cell coercion.
//!
//! Every logical column exists after loading, whether or not the input had it.
//! Coercion never fails: unusable numbers become `0`, and stringified missing
//! values become the empty string so that presence checks (`!s.is_empty()`)
//! mean what they say.

use crate::error::{Error, Result};
use crate::types::{DurationField, RunRecord, RunTable};
use csv::StringRecord;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Spellings of "no value" produced by common CSV writers.
pub const NULL_SENTINELS: [&str; 6] = ["nan", "NaN", "None", "<nil>", "null", "<NA>"];

/// Read a run table from a CSV file and remember where it came from.
pub fn load_csv(path: impl AsRef<Path>) -> Result<RunTable> {
	let path = path.as_ref();
	let file = File::open(path)?;
	let table = load_from_reader(BufReader::new(file))?.with_source(path);
	debug!(path = %path.display(), rows = table.rows_total(), columns = table.columns.len(), "loaded run table");
	Ok(table)
}

/// Decode a run table from any reader. Header names are trimmed.
pub fn load_from_reader<R: Read>(reader: R) -> Result<RunTable> {
	let mut rdr = csv::ReaderBuilder::new()
		.flexible(true)
		.trim(csv::Trim::Headers)
		.from_reader(reader);
	let headers = rdr.headers()?.clone();
	if headers.iter().all(str::is_empty) {
		return Err(Error::table("no columns to parse from file"));
	}
	let index = ColumnIndex::new(&headers);

	let mut rows = Vec::new();
	for (n, rec) in rdr.records().enumerate() {
		let rec = rec?;
		if rec.len() > headers.len() {
			return Err(Error::table(format!(
				"record {} has {} fields, header has {}",
				n + 1,
				rec.len(),
				headers.len()
			)));
		}
		rows.push(index.record(&rec));
	}

	Ok(RunTable { source: None, columns: headers.iter().map(str::to_string).collect(), rows })
}

struct ColumnIndex {
	by_name: HashMap<String, usize>,
}

impl ColumnIndex {
	fn new(headers: &StringRecord) -> Self {
		let mut by_name = HashMap::new();
		for (i, h) in headers.iter().enumerate() {
			// first occurrence wins on duplicate headers
			by_name.entry(h.to_string()).or_insert(i);
		}
		Self { by_name }
	}

	fn cell<'r>(&self, rec: &'r StringRecord, name: &str) -> Option<&'r str> {
		self.by_name.get(name).and_then(|i| rec.get(*i))
	}

	fn record(&self, rec: &StringRecord) -> RunRecord {
		let text = |name: &str| coerce_text(self.cell(rec, name));
		let mut out = RunRecord {
			mode: text("mode"),
			workers: coerce_count(self.cell(rec, "workers")),
			is_warmup: coerce_flag(self.cell(rec, "is_warmup")),
			status: text("status"),
			error: text("error"),
			tx_id: text("tx_id"),
			merkle_root: text("merkle_root"),
			merkle_batch_size: coerce_count(self.cell(rec, "merkle_batch_size")),
			doc_hash_hex: text("doc_hash_hex"),
			storage_path: text("storage_path"),
			req_start_unix_ns: coerce_ns(self.cell(rec, "req_start_unix_ns")),
			req_end_unix_ns: coerce_ns(self.cell(rec, "req_end_unix_ns")),
			..RunRecord::default()
		};
		for field in DurationField::ALL {
			*out.durations.get_mut(field) = coerce_f64(self.cell(rec, field.column()));
		}
		out
	}
}

/// Finite number or `0.0`.
pub fn coerce_f64(raw: Option<&str>) -> f64 {
	raw.and_then(|s| s.trim().parse::<f64>().ok())
		.filter(|v| v.is_finite())
		.unwrap_or(0.0)
}

/// Non-negative integer, truncating fractions; anything else is `0`.
pub fn coerce_count(raw: Option<&str>) -> u32 {
	let v = coerce_f64(raw).trunc();
	if v > 0.0 { v as u32 } else { 0 }
}

/// Nanosecond timestamp. Integers are parsed exactly since epoch nanoseconds
/// exceed f64's integer precision.
pub fn coerce_ns(raw: Option<&str>) -> i64 {
	let Some(s) = raw.map(str::trim) else { return 0 };
	s.parse::<i64>().unwrap_or_else(|_| coerce_f64(Some(s)) as i64)
}

/// `true`/`false` in any case, or a number where nonzero means set.
pub fn coerce_flag(raw: Option<&str>) -> bool {
	let Some(s) = raw.map(str::trim) else { return false };
	if s.eq_ignore_ascii_case("true") { return true; }
	if s.eq_ignore_ascii_case("false") { return false; }
	coerce_f64(Some(s)).trunc() != 0.0
}

/// Text cell; null spellings and missing cells become empty.
pub fn coerce_text(raw: Option<&str>) -> String {
	match raw {
		Some(s) if !NULL_SENTINELS.contains(&s) => s.to_string(),
		_ => String::new(),
	}
}
