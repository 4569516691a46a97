use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use acctsum::config::{self, Settings};
use acctsum::pipeline;

/// Accounting-log ingestion: aggregate one year of finished jobs into a
/// per-user usage snapshot.
#[derive(Parser)]
#[command(name = "acctsum", about, version)]
struct Cli {
    /// Directory containing the scheduler accounting logs.
    #[arg(short, long)]
    dir: PathBuf,

    /// Calendar year to aggregate.
    #[arg(short, long)]
    year: i32,

    /// Upper bound on parallel file workers.
    #[arg(short, long, default_value_t = config::DEFAULT_WORKER_LIMIT)]
    workers: usize,

    /// Holiday list file: one "<year> <month-day>" entry per line.
    #[arg(long, default_value = "holidays.txt")]
    holidays: PathBuf,

    /// Directory the year snapshot is written to.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Logging verbosity level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level)
        .with_context(|| format!("invalid log level: {}", cli.log_level))?;
    fmt().with_env_filter(filter).with_target(true).init();

    let settings = Settings::new(cli.dir, cli.year, cli.workers, cli.holidays, cli.out)?;

    let summary = pipeline::run(&settings)?;

    println!(
        "{} files, {} records, {} users -> {} in {:.2}s",
        summary.files,
        summary.records,
        summary.users,
        summary.snapshot_path.display(),
        summary.elapsed.as_secs_f64(),
    );

    Ok(())
}
