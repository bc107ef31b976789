#![forbid(unsafe_code)]
//! Validation and metrics reduction for per-request benchmark records.
//!
//! Data flows one way: [`loader`] turns a CSV into a [`RunTable`];
//! [`validate`] and [`reduce`] look at one table at a time; [`aggregate`]
//! combines the resulting [`RunMetrics`] across repeats. [`batch`] drives the
//! whole pipeline over many files.

pub mod aggregate;
pub mod batch;
pub mod blob;
pub mod config;
pub mod error;
pub mod identity;
pub mod loader;
pub mod reduce;
pub mod stats;
pub mod types;
pub mod validate;

pub use aggregate::{aggregate, GroupKey, GroupedMetrics};
pub use batch::{analyze_files, analyze_path, discover_inputs, BatchReport, RunOutcome};
pub use config::{AnalysisConfig, BenchConfig, DEFAULT_TOLERANCE_SEC};
pub use error::{Error, Result};
pub use loader::{load_csv, load_from_reader};
pub use reduce::{reduce, reduce_csv, RunMetrics};
pub use stats::{LatencySummary, MeanStd};
pub use types::{DurationField, Durations, RunRecord, RunTable};
pub use validate::{validate, validate_csv, Validation};
