//! Arithmetic mean and its display rounding.

use crate::types::Number;

/// Mean of `values`; `0.0` when empty.
pub fn average(values: &[Number]) -> f64 {
	if values.is_empty() {
		return 0.0;
	}
	let sum: f64 = values.iter().copied().map(f64::from).sum();
	sum / values.len() as f64
}

/// Round to two decimals, ties away from zero.
pub fn round_for_display(v: f64) -> f64 {
	(v * 100.0).round() / 100.0
}

/// Render with exactly two decimals after [`round_for_display`].
pub fn format_average(v: f64) -> String {
	format!("{:.2}", round_for_display(v))
}
