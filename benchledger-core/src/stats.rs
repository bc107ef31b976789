//! Small statistics helpers. Undefined results are `f64::NAN`, never a panic.

use serde::{Deserialize, Serialize};

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
	if values.is_empty() {
		return f64::NAN;
	}
	values.iter().sum::<f64>() / values.len() as f64
}

/// Quantile `q` in `[0, 1]` of an ascending slice, interpolating linearly
/// between the two nearest order statistics.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
	if sorted.is_empty() {
		return f64::NAN;
	}
	let q = q.clamp(0.0, 1.0);
	let h = (sorted.len() - 1) as f64 * q;
	let lo = h.floor() as usize;
	let hi = h.ceil() as usize;
	let frac = h - lo as f64;
	sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Sample standard deviation (N-1 denominator); NaN below two values.
pub fn sample_std(values: &[f64]) -> f64 {
	if values.len() < 2 {
		return f64::NAN;
	}
	let m = mean(values);
	let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
	(ss / (values.len() - 1) as f64).sqrt()
}

/// Mean and sample standard deviation over the defined (non-NaN) values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanStd {
	/// Mean of the defined values.
	pub mean: f64,
	/// Sample standard deviation; NaN below two values.
	pub std: f64,
}

impl MeanStd {
	/// Summarise `values`, ignoring NaN.
	pub fn of(values: impl IntoIterator<Item = f64>) -> Self {
		let defined: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
		Self { mean: mean(&defined), std: sample_std(&defined) }
	}
}

/// Mean and tail percentiles of one latency column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
	/// Arithmetic mean.
	pub mean: f64,
	/// Median.
	pub p50: f64,
	/// 95th percentile.
	pub p95: f64,
	/// 99th percentile.
	pub p99: f64,
}

impl LatencySummary {
	/// All NaN; used when there are no samples.
	pub const UNDEFINED: Self = Self { mean: f64::NAN, p50: f64::NAN, p95: f64::NAN, p99: f64::NAN };

	/// Summarise a latency column. Empty input gives [`Self::UNDEFINED`].
	pub fn from_samples(mut samples: Vec<f64>) -> Self {
		if samples.is_empty() {
			return Self::UNDEFINED;
		}
		samples.sort_by(f64::total_cmp);
		Self {
			mean: mean(&samples),
			p50: quantile_sorted(&samples, 0.50),
			p95: quantile_sorted(&samples, 0.95),
			p99: quantile_sorted(&samples, 0.99),
		}
	}
}
