// src/stats.rs

use std::io::{self, BufRead};

use serde::Serialize;

/// Descriptive summary of a sample of timing measurements.
///
/// Quartiles and percentiles use plain nearest-rank indexing into the
/// sorted sample (no interpolation), and the high percentiles fall
/// back to the maximum when the sample is too small for the rank to
/// mean anything: p95 needs n >= 20, p99 needs n >= 100.
#[derive(Debug, Clone, Serialize)]
pub struct StatSummary {
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub outliers: usize,
    pub clean_mean: f64,
    pub cv: f64,
}

/// Compute the summary for a sample. Returns None for an empty sample.
///
/// Outliers are values strictly outside the Tukey fences
/// [q1 - 1.5*iqr, q3 + 1.5*iqr]; `clean_mean` is the mean with those
/// removed. `cv` is the coefficient of variation in percent. All
/// fields are rounded to 6 decimal places except `cv` (2).
pub fn compute_stats(values: &[f64]) -> Option<StatSummary> {
    if values.is_empty() {
        return None;
    }

    let n = values.len();
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let stddev = if n >= 2 {
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };

    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    let min = sorted[0];
    let max = sorted[n - 1];

    let (q1, q3) = if n >= 4 {
        (sorted[n / 4], sorted[(3 * n) / 4])
    } else {
        (min, max)
    };
    let iqr = q3 - q1;

    let percentile = |p: f64| sorted[(p * (n - 1) as f64) as usize];
    let p50 = percentile(0.50);
    let p95 = if n >= 20 { percentile(0.95) } else { max };
    let p99 = if n >= 100 { percentile(0.99) } else { max };

    let low_fence = q1 - 1.5 * iqr;
    let high_fence = q3 + 1.5 * iqr;
    let clean: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|v| *v >= low_fence && *v <= high_fence)
        .collect();
    let outliers = n - clean.len();
    let clean_mean = if clean.is_empty() {
        mean
    } else {
        clean.iter().sum::<f64>() / clean.len() as f64
    };

    let cv = if mean > 0.0 { stddev / mean * 100.0 } else { 0.0 };

    Some(StatSummary {
        n,
        mean: round6(mean),
        median: round6(median),
        stddev: round6(stddev),
        min: round6(min),
        max: round6(max),
        q1: round6(q1),
        q3: round6(q3),
        iqr: round6(iqr),
        p50: round6(p50),
        p95: round6(p95),
        p99: round6(p99),
        outliers,
        clean_mean: round6(clean_mean),
        cv: round2(cv),
    })
}

/// Read one f64 per line. Blank and non-numeric lines are skipped.
pub fn read_values<R: BufRead>(reader: R) -> io::Result<Vec<f64>> {
    let mut values = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if let Ok(value) = line.trim().parse::<f64>() {
            values.push(value);
        }
    }
    Ok(values)
}

fn round6(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}

fn round2(x: f64) -> f64 {
    (x * 1e2).round() / 1e2
}
