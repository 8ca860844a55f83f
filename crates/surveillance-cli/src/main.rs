//! `surveil` CLI — run the supervision coverage engine over JSON snapshots.
//!
//! ## Usage
//!
//! ```sh
//! # Coverage of every exam against the standard window catalogue
//! surveil coverage -i exams.json
//!
//! # Only the exams no window covers
//! surveil coverage -i exams.json --uncovered-only
//!
//! # Merge per-room rows into consolidated groups
//! surveil consolidate -i exams.json -o groups.json
//!
//! # Week -> day -> window calendar of consolidated groups
//! surveil calendar --grouped -i exams.json
//!
//! # One day, with a custom catalogue and buffer
//! surveil --config windows.toml --buffer 30 day --date 2026-01-12 -i exams.json
//!
//! # Counters for a dashboard
//! cat exams.json | surveil summary
//! ```

use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use surveillance_engine::coverage::CoverageSummary;
use surveillance_engine::{
    analyze_coverage, consolidate, day_schedule, validate_rows, week_schedule, EngineConfig,
    ExamSession,
};
use tracing::{debug, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "surveil",
    version,
    about = "Exam supervision window coverage and consolidation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML file with `buffer_minutes` and `[[windows]]` (standard catalogue if omitted)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Preparation buffer in minutes, overriding the configuration
    #[arg(long, global = true)]
    buffer: Option<u32>,

    /// Log filter, e.g. "warn" or "surveillance_engine=debug"
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Report which windows cover each exam
    Coverage {
        /// Input JSON array of exams (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Only list exams that no window covers
        #[arg(long)]
        uncovered_only: bool,
    },
    /// Merge per-room rows into consolidated groups
    Consolidate {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Week -> day -> window calendar view
    Calendar {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        /// Consolidate rows before placing them on the calendar
        #[arg(long)]
        grouped: bool,
    },
    /// Windows in use on a single day
    Day {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        /// Day to show (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        grouped: bool,
    },
    /// Print coverage and grouping counters
    Summary {
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(io::stderr().is_terminal())
                .with_writer(io::stderr),
        )
        .init();

    let config = load_config(cli.config.as_deref(), cli.buffer)?;
    debug!(
        buffer_minutes = config.buffer_minutes,
        windows = config.windows.len(),
        "configuration loaded"
    );

    match cli.command {
        Commands::Coverage {
            input,
            output,
            uncovered_only,
        } => {
            let exams = read_exams(input.as_deref())?;
            let mut results = analyze_coverage(&exams, &config.windows, config.buffer_minutes)
                .context("Failed to analyze coverage")?;
            if uncovered_only {
                results.retain(|r| !r.is_covered);
            }
            write_json(output.as_deref(), &results)?;
        }
        Commands::Consolidate { input, output } => {
            let exams = read_exams(input.as_deref())?;
            write_json(output.as_deref(), &consolidate(&exams))?;
        }
        Commands::Calendar {
            input,
            output,
            grouped,
        } => {
            let exams = read_exams(input.as_deref())?;
            if grouped {
                let view = week_schedule(&consolidate(&exams), &config.windows, config.buffer_minutes)
                    .context("Failed to build calendar")?;
                write_json(output.as_deref(), &view)?;
            } else {
                let view = week_schedule(&exams, &config.windows, config.buffer_minutes)
                    .context("Failed to build calendar")?;
                write_json(output.as_deref(), &view)?;
            }
        }
        Commands::Day {
            input,
            output,
            date,
            grouped,
        } => {
            let exams = read_exams(input.as_deref())?;
            if grouped {
                let day = day_schedule(
                    date,
                    &consolidate(&exams),
                    &config.windows,
                    config.buffer_minutes,
                )
                .context("Failed to build day view")?;
                write_json(output.as_deref(), &day)?;
            } else {
                let day = day_schedule(date, &exams, &config.windows, config.buffer_minutes)
                    .context("Failed to build day view")?;
                write_json(output.as_deref(), &day)?;
            }
        }
        Commands::Summary { input } => {
            let exams = read_exams(input.as_deref())?;
            let results = analyze_coverage(&exams, &config.windows, config.buffer_minutes)
                .context("Failed to analyze coverage")?;
            let summary = CoverageSummary::from_results(&results);
            let groups = consolidate(&exams);
            let ready = groups.iter().filter(|g| g.can_be_validated).count();
            let supervisors: u64 = groups.iter().map(|g| g.total_supervisors).sum();

            println!("Exams:        {}", summary.total);
            println!("Covered:      {}", summary.covered);
            println!("Uncovered:    {}", summary.uncovered);
            for id in &summary.uncovered_ids {
                println!("  - {}", id);
            }
            println!("Groups:       {}", groups.len());
            println!("Validated:    {}", ready);
            println!("Supervisors:  {}", supervisors);
        }
    }

    Ok(())
}

/// Load the configuration file (or the standard catalogue) and apply the
/// `--buffer` override.
fn load_config(path: Option<&str>, buffer: Option<u32>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration: {}", path))?,
        None => EngineConfig::standard(),
    };
    if let Some(buffer) = buffer {
        config.buffer_minutes = buffer;
    }
    Ok(config)
}

/// Read a JSON array of exams, dropping malformed rows with a logged warning
/// instead of failing the whole batch. Rows with an inverted interval are
/// reported by `validate_rows` itself.
fn read_exams(path: Option<&str>) -> Result<Vec<ExamSession>> {
    let raw = read_input(path)?;
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(&raw).context("Input must be a JSON array of exams")?;

    let mut parsed = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<ExamSession>(row) {
            Ok(exam) => parsed.push(exam),
            Err(error) => warn!(index, %error, "skipping malformed exam row"),
        }
    }

    let outcome = validate_rows(&parsed);
    info!(
        accepted = outcome.valid.len(),
        rejected = outcome.rejected.len(),
        "exam rows loaded"
    );
    Ok(outcome.valid)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_json<T: Serialize>(path: Option<&str>, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
