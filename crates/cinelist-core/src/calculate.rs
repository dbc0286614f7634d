//! Rating and runtime arithmetic for the watched summary.

use std::sync::LazyLock;

use regex::Regex;

/// "120 min"
static RE_SIMPLE_MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*min").unwrap());

/// "2h" in "2h 30m"
static RE_HOURS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)h").unwrap());

/// "30m" in "2h 30m"
static RE_MINUTES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)m").unwrap());

/// Arithmetic mean; 0 for an empty slice.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean of the non-NaN values; 0 when none remain.
pub fn average_runtime(values: &[f64]) -> f64 {
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    average(&valid)
}

/// Convert a runtime like `"120 min"` or `"2h 30m"` to minutes.
///
/// Missing or unrecognized input yields 0.
pub fn parse_runtime(runtime: Option<&str>) -> u32 {
    let Some(runtime) = runtime.filter(|r| !r.trim().is_empty()) else {
        return 0;
    };

    let capture = |re: &Regex| {
        re.captures(runtime)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
    };

    if let Some(minutes) = capture(&RE_SIMPLE_MINUTES) {
        return minutes;
    }

    let hours = capture(&RE_HOURS).unwrap_or(0);
    let minutes = capture(&RE_MINUTES).unwrap_or(0);
    hours.saturating_mul(60).saturating_add(minutes)
}
