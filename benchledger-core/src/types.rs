//! Per-request records and the run table built from them.

use std::path::{Path, PathBuf};

/// Mode label of runs that perform no ledger or merkle commitment.
pub const BASELINE_MODE: &str = "baseline";

/// Per-request duration columns, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationField {
	/// Whole request.
	Total,
	/// Content hashing.
	Hash,
	/// Blob write.
	Storage,
	/// Metadata insert.
	Db,
	/// Ledger submission.
	Ledger,
	/// Time queued for a merkle batch.
	MerkleWait,
	/// Tree construction, shared by the batch.
	MerkleBuild,
	/// Root submission, shared by the batch.
	MerkleLedger,
}

impl DurationField {
	/// Every duration column.
	pub const ALL: [DurationField; 8] = [
		Self::Total,
		Self::Hash,
		Self::Storage,
		Self::Db,
		Self::Ledger,
		Self::MerkleWait,
		Self::MerkleBuild,
		Self::MerkleLedger,
	];

	/// Stages on a request's critical path. Merkle build/ledger time is shared
	/// by the whole batch and is reported separately.
	pub const STAGES: [DurationField; 5] = [Self::Hash, Self::Storage, Self::Db, Self::Ledger, Self::MerkleWait];

	/// CSV column name.
	pub fn column(self) -> &'static str {
		match self {
			Self::Total => "total_sec",
			Self::Hash => "hash_sec",
			Self::Storage => "storage_sec",
			Self::Db => "db_sec",
			Self::Ledger => "ledger_sec",
			Self::MerkleWait => "merkle_wait_sec",
			Self::MerkleBuild => "merkle_build_sec",
			Self::MerkleLedger => "merkle_ledger_sec",
		}
	}
}

/// Stage and total durations of one request, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Durations {
	/// End-to-end request time.
	pub total_sec: f64,
	/// See [`DurationField::Hash`].
	pub hash_sec: f64,
	/// See [`DurationField::Storage`].
	pub storage_sec: f64,
	/// See [`DurationField::Db`].
	pub db_sec: f64,
	/// See [`DurationField::Ledger`].
	pub ledger_sec: f64,
	/// See [`DurationField::MerkleWait`].
	pub merkle_wait_sec: f64,
	/// See [`DurationField::MerkleBuild`].
	pub merkle_build_sec: f64,
	/// See [`DurationField::MerkleLedger`].
	pub merkle_ledger_sec: f64,
}

impl Durations {
	/// Value of one column.
	pub fn get(&self, field: DurationField) -> f64 {
		match field {
			DurationField::Total => self.total_sec,
			DurationField::Hash => self.hash_sec,
			DurationField::Storage => self.storage_sec,
			DurationField::Db => self.db_sec,
			DurationField::Ledger => self.ledger_sec,
			DurationField::MerkleWait => self.merkle_wait_sec,
			DurationField::MerkleBuild => self.merkle_build_sec,
			DurationField::MerkleLedger => self.merkle_ledger_sec,
		}
	}

	/// Mutable access to one column.
	pub fn get_mut(&mut self, field: DurationField) -> &mut f64 {
		match field {
			DurationField::Total => &mut self.total_sec,
			DurationField::Hash => &mut self.hash_sec,
			DurationField::Storage => &mut self.storage_sec,
			DurationField::Db => &mut self.db_sec,
			DurationField::Ledger => &mut self.ledger_sec,
			DurationField::MerkleWait => &mut self.merkle_wait_sec,
			DurationField::MerkleBuild => &mut self.merkle_build_sec,
			DurationField::MerkleLedger => &mut self.merkle_ledger_sec,
		}
	}

	/// Sum of [`DurationField::STAGES`].
	pub fn stage_sum(&self) -> f64 {
		DurationField::STAGES.iter().map(|f| self.get(*f)).sum()
	}
}

/// One normalized request row. Absent cells carry their canonical default
/// (`0`, `false` or the empty string).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunRecord {
	/// Run mode, e.g. `baseline`, `ledger`, `merkle_batched`.
	pub mode: String,
	/// Concurrent client workers.
	pub workers: u32,
	/// Warmup rows only count toward `rows_warmup`.
	pub is_warmup: bool,
	/// `ok` on success.
	pub status: String,
	/// Error text of a failed request.
	pub error: String,
	/// Ledger transaction id; empty when none was issued.
	pub tx_id: String,
	/// Root of the batch this request was committed in.
	pub merkle_root: String,
	/// Configured batch size; 0 outside merkle modes.
	pub merkle_batch_size: u32,
	/// Expected SHA-256 of the stored blob.
	pub doc_hash_hex: String,
	/// Where the blob was stored, absolute or relative to the CSV.
	pub storage_path: String,
	/// Stage timings.
	pub durations: Durations,
	/// Request start, Unix nanoseconds.
	pub req_start_unix_ns: i64,
	/// Request end, Unix nanoseconds.
	pub req_end_unix_ns: i64,
}

impl RunRecord {
	/// `status` equals `ok`, any case.
	pub fn status_ok(&self) -> bool { self.status.eq_ignore_ascii_case("ok") }
	/// A transaction id was recorded.
	pub fn has_tx_id(&self) -> bool { !self.tx_id.is_empty() }
	/// A merkle root was recorded.
	pub fn has_merkle_root(&self) -> bool { !self.merkle_root.is_empty() }
}

/// The rows of one benchmark run, as produced by the loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunTable {
	/// File the table was read from; used for identity and blob lookup.
	pub source: Option<PathBuf>,
	/// Header columns present in the input, in input order.
	pub columns: Vec<String>,
	/// Rows in file order.
	pub rows: Vec<RunRecord>,
}

impl RunTable {
	/// Table without a backing file.
	pub fn new(rows: Vec<RunRecord>) -> Self { Self { source: None, columns: Vec::new(), rows } }

	/// Attach the file the table was read from.
	pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
		self.source = Some(path.into());
		self
	}

	/// Directory of the backing file.
	pub fn source_dir(&self) -> Option<&Path> { self.source.as_deref().and_then(Path::parent) }

	/// All rows.
	pub fn rows_total(&self) -> usize { self.rows.len() }

	/// Rows flagged as warmup.
	pub fn rows_warmup(&self) -> usize { self.rows.iter().filter(|r| r.is_warmup).count() }

	/// Rows not flagged as warmup.
	pub fn rows_main(&self) -> usize { self.rows_total() - self.rows_warmup() }

	/// No rows at all.
	pub fn is_empty(&self) -> bool { self.rows.is_empty() }

	/// Non-warmup rows, the only ones that enter statistics.
	pub fn main_rows(&self) -> impl Iterator<Item = &RunRecord> + '_ {
		self.rows.iter().filter(|r| !r.is_warmup)
	}

	/// Mode label of the run (first row).
	pub fn mode(&self) -> &str { self.rows.first().map(|r| r.mode.as_str()).unwrap_or("") }

	/// Workers of the first row.
	pub fn workers(&self) -> u32 { self.rows.first().map(|r| r.workers).unwrap_or(0) }

	/// Mode is [`BASELINE_MODE`].
	pub fn is_baseline(&self) -> bool { self.mode() == BASELINE_MODE }

	/// Largest batch size over all rows.
	pub fn max_merkle_batch_size(&self) -> u32 { self.rows.iter().map(|r| r.merkle_batch_size).max().unwrap_or(0) }

	/// Merkle mode as seen by validation: a root or a positive batch size on any row.
	pub fn has_merkle_activity(&self) -> bool {
		self.rows.iter().any(RunRecord::has_merkle_root) || self.max_merkle_batch_size() > 0
	}

	/// Merkle mode as seen by reduction: a root on a main row or a positive batch size.
	pub fn is_merkle_run(&self) -> bool {
		self.main_rows().any(RunRecord::has_merkle_root) || self.max_merkle_batch_size() > 0
	}
}
