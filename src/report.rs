use serde_json::json;

use crate::bench::Workload;
use crate::mcp::ToolCallOutcome;
use crate::stats::StatSummary;

/// Human-readable run report. Times in seconds, three decimals.
pub fn bench_text(workload: &Workload) -> String {
    let report = &workload.report;
    format!(
        "Input rows: {}\n\
         Output rows: {}\n\
         Dropped lines: {}\n\
         Parse time: {:.3}s\n\
         Operation time: {:.3}s\n\
         Total time: {:.3}s",
        report.rows_in,
        report.rows_out,
        workload.dropped,
        report.parse_time,
        report.operation_time,
        report.total_time
    )
}

/// Machine-readable run report: the five timing/count fields.
pub fn bench_json(workload: &Workload) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&workload.report)
}

/// Statistical summary, or the explicit marker for empty input.
pub fn stats_json(summary: Option<&StatSummary>) -> serde_json::Result<String> {
    match summary {
        Some(summary) => serde_json::to_string_pretty(summary),
        None => serde_json::to_string_pretty(&json!({"error": "no values"})),
    }
}

/// Tool-call response wrapped with the exchange's wall-clock time.
pub fn call_json(outcome: &ToolCallOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json!({
        "result": outcome.response,
        "elapsed_seconds": outcome.elapsed.as_secs_f64(),
    }))
}
