// src/lib.rs
pub mod bench;
pub mod error;
pub mod formats;
pub mod generate;
pub mod mcp;
pub mod query;
pub mod report;
pub mod stats;
pub mod table;

pub use error::*;
pub use table::*;

pub use bench::{run_workload, BenchReport, Workload};
pub use formats::LogFormat;
pub use mcp::{call_tool, McpError, ToolCallOutcome};
pub use query::Operation;
pub use stats::{compute_stats, StatSummary};
