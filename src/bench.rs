use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::formats::{self, LogFormat};
use crate::query::{self, Operation};
use crate::table::RecordTable;

/// Row counts and phase timings for one run. Times are seconds.
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub parse_time: f64,
    pub operation_time: f64,
    pub total_time: f64,
}

/// A completed run: the operator output, the number of malformed
/// input lines, and the timing report.
#[derive(Debug)]
pub struct Workload {
    pub result: RecordTable,
    pub dropped: usize,
    pub report: BenchReport,
}

/// Parse the file, apply the operation, and time each phase with a
/// wall clock. `rows_in` counts parsed records only; dropped lines
/// are reported separately.
pub fn run_workload(
    path: &Path,
    format: LogFormat,
    operation: Operation,
    pattern: &str,
) -> anyhow::Result<Workload> {
    let parse_start = Instant::now();
    let outcome = formats::parse_file(path, format)?;
    let parse_time = parse_start.elapsed().as_secs_f64();

    let op_start = Instant::now();
    let result = query::apply(&outcome.table, format, operation, pattern)?;
    let operation_time = op_start.elapsed().as_secs_f64();

    let report = BenchReport {
        rows_in: outcome.table.len(),
        rows_out: result.len(),
        parse_time,
        operation_time,
        total_time: parse_time + operation_time,
    };

    Ok(Workload {
        result,
        dropped: outcome.dropped,
        report,
    })
}
