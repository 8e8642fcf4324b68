//! CSV summary of experiment results.
//!
//! The report has one header line followed by one line per result, in the
//! order the results were produced. Each line carries the mean of the
//! result's samples rounded to three decimals.

use crate::experiments::{ExperimentResult, MetricKind};

/// Header line of every report.
pub const REPORT_HEADER: &str = "model_name,metric,average_score";

/// One aggregated line of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub model_name: String,
    pub metric: MetricKind,
    pub average_score: f64,
}

/// Generate an experiment summary report in CSV format.
///
/// Deterministic: the same input always yields byte-identical output.
pub fn generate_summary(results: &[ExperimentResult]) -> String {
    let mut report = String::with_capacity(REPORT_HEADER.len() + 1 + results.len() * 32);
    report.push_str(REPORT_HEADER);
    report.push('\n');

    for row in summary_rows(results) {
        report.push_str(&format!(
            "{},{},{}\n",
            row.model_name,
            row.metric,
            format_score(row.average_score)
        ));
    }

    report
}

/// Aggregate each result into a [`SummaryRow`], keeping input order.
pub fn summary_rows(results: &[ExperimentResult]) -> Vec<SummaryRow> {
    results
        .iter()
        .map(|result| SummaryRow {
            model_name: result.model_name().to_string(),
            metric: result.metric(),
            average_score: average_score(result),
        })
        .collect()
}

/// Mean of the result's data points, rounded to three decimals.
pub fn average_score(result: &ExperimentResult) -> f64 {
    let points = result.data_points();
    let mean = points.iter().sum::<f64>() / points.len() as f64;
    round_score(mean)
}

/// Round to three decimals using the exact binary value of `value`.
///
/// Goes through `{:.3}` formatting rather than `(v * 1000.0).round()`, which
/// would introduce a second rounding step on the multiplication.
pub fn round_score(value: f64) -> f64 {
    format!("{:.3}", value).parse().unwrap_or(value)
}

/// Shortest decimal that round-trips, always with a fractional part.
///
/// Exponents carry an explicit sign and at least two digits (`1e+16`,
/// `1.5e-07`), the common notation for large and tiny floats.
fn format_score(value: f64) -> String {
    let text = format!("{:?}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}
