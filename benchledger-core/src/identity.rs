//! Experiment identity derived from run file names.
//!
//! `bench_w8_c2000_r01.csv` has id `bench_w8_c2000_r01` and group
//! `bench_w8_c2000`; repeats of one configuration share the group.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

#[allow(clippy::expect_used)]
static REPEAT_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_-]r\d+$").expect("repeat suffix pattern"));

/// File base name without its extension.
pub fn experiment_id(path: &Path) -> String {
	path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Experiment id with a trailing repeat tag (`_r01`, `-r2`) removed.
pub fn experiment_group(id: &str) -> String {
	REPEAT_SUFFIX.replace(id, "").into_owned()
}
