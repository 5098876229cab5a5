use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use logbench::formats::LogFormat;
use logbench::query::Operation;
use logbench::{bench, generate, mcp, report, stats};

#[derive(Parser)]
#[command(name = "logbench")]
#[command(about = "Benchmark log parsing and query workloads")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a log file, apply one operation, report timings
    Run {
        /// Log file to process
        file: PathBuf,

        /// Input log format
        #[arg(short, long)]
        format: LogFormat,

        /// Operation to benchmark
        #[arg(short, long)]
        operation: Operation,

        /// Regex for the search operation
        #[arg(short, long, default_value = "timeout|connection")]
        pattern: String,

        /// Emit the report as JSON instead of text
        #[arg(long)]
        json_output: bool,
    },

    /// Summarize timing samples read from stdin, one number per line
    Stats,

    /// Invoke one tool on a stdio tool server and print its response
    Call {
        /// Server executable to spawn
        server: PathBuf,

        /// Tool to invoke
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(default_value = "{}")]
        arguments: String,

        /// How long to wait for each server response
        #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
        timeout: Duration,
    },

    /// Generate a synthetic log file
    Generate {
        /// Output file path
        output: PathBuf,

        /// Log format to produce
        #[arg(short, long)]
        format: LogFormat,

        /// Number of lines to generate
        #[arg(short, long, default_value = "1000000")]
        lines: usize,

        /// Fraction of error lines (0.0 - 1.0)
        #[arg(short, long, default_value = "0.05")]
        error_rate: f64,

        /// Seed for reproducible output
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("logbench: error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run {
            file,
            format,
            operation,
            pattern,
            json_output,
        } => {
            let workload = bench::run_workload(&file, format, operation, &pattern)?;
            if json_output {
                println!("{}", report::bench_json(&workload)?);
            } else {
                println!("{}", report::bench_text(&workload));
            }
        }

        Commands::Stats => {
            let values = stats::read_values(io::stdin().lock())
                .map_err(|e| anyhow::anyhow!("cannot read samples from stdin: {}", e))?;
            let summary = stats::compute_stats(&values);
            println!("{}", report::stats_json(summary.as_ref())?);
        }

        Commands::Call {
            server,
            tool,
            arguments,
            timeout,
        } => {
            let arguments: serde_json::Value = serde_json::from_str(&arguments)
                .map_err(|e| anyhow::anyhow!("tool arguments are not valid JSON: {}", e))?;
            let outcome = mcp::call_tool(&server, &tool, &arguments, timeout)?;
            println!("{}", report::call_json(&outcome)?);
        }

        Commands::Generate {
            output,
            format,
            lines,
            error_rate,
            seed,
        } => {
            let bytes = generate::generate_file(&output, format, lines, error_rate, seed)
                .map_err(|e| anyhow::anyhow!("cannot write {}: {}", output.display(), e))?;
            let size_mb = bytes as f64 / (1024.0 * 1024.0);
            println!(
                "Generated {} lines ({:.2} MB) to {}",
                lines,
                size_mb,
                output.display()
            );
        }
    }

    Ok(())
}
