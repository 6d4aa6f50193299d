//! schedsim - Simulate CPU scheduling policies over a workload file.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use schedsim::{write_thread_table, Policy, SimConfig, Simulator, Workload, DEFAULT_QUANTUM};

/// Simulate CPU scheduling policies over a workload description.
#[derive(Parser)]
#[command(name = "schedsim")]
struct Cli {
    /// Print a trace record for every scheduler transition.
    #[arg(short, long)]
    verbose: bool,

    /// Print a per-thread summary table after the run.
    #[arg(short = 't', long = "per_thread")]
    per_thread: bool,

    /// Scheduling algorithm: FCFS, RR, PRIORITY, or CUSTOM.
    #[arg(short, long, default_value = "FCFS")]
    algorithm: Policy,

    /// Round-robin time quantum (other algorithms ignore it).
    #[arg(short, long, default_value_t = DEFAULT_QUANTUM,
          value_parser = clap::value_parser!(u64).range(1..))]
    quantum: u64,

    /// Path to the workload description file.
    workload: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let text = fs::read_to_string(&cli.workload)
        .with_context(|| format!("failed to read {}", cli.workload.display()))?;
    let workload = Workload::parse(&text)
        .with_context(|| format!("failed to parse {}", cli.workload.display()))?;

    let config = SimConfig {
        policy: cli.algorithm,
        quantum: cli.quantum,
    };
    let result = Simulator::new(&workload, &config).run();

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    if cli.verbose {
        result.trace.write_verbose(&mut out)?;
    }
    if cli.per_thread {
        write_thread_table(&result.threads, &mut out)?;
    }
    result.report.write_summary(&mut out)?;
    out.flush()?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}
