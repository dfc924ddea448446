mod handlers;

use anyhow::{bail, Result};
use chrono::{DateTime, FixedOffset, Utc};
use clap::{ArgGroup, Parser, Subcommand};
use classboard::engine::assignments::AssignmentTab;
use classboard::engine::clock::{parse_utc_offset, utc_offset, Clock, FixedClock, SystemClock};
use classboard::engine::config::{EngineConfig, DEFAULT_DURATION_MINUTES};
use classboard::engine::window::parse_instant;
use handlers::RunContext;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "classboard", version, about = "Lifecycle buckets for sessions and assignments")]
struct Cli {
    /// Evaluate at this instant instead of the system clock (RFC 3339)
    #[arg(long, global = true, value_parser = parse_now)]
    now: Option<DateTime<Utc>>,
    /// Viewer UTC offset for the "today" bucket (e.g. +02:00)
    #[arg(long, global = true, allow_hyphen_values = true, value_parser = parse_offset)]
    utc_offset: Option<FixedOffset>,
    /// Session length assumed when durationMinutes is missing
    #[arg(long, global = true, default_value_t = DEFAULT_DURATION_MINUTES)]
    default_duration: i64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Bucket a session snapshot into ongoing/today/upcoming/past
    Sessions {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Resolve assignment statuses and show one dashboard tab
    Assignments {
        file: PathBuf,
        #[arg(long, short = 't', default_value = "all")]
        tab: AssignmentTab,
        #[arg(long)]
        json: bool,
    },
    /// Evaluate both snapshots in one pass
    Board {
        #[arg(long)]
        sessions: PathBuf,
        #[arg(long)]
        assignments: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Explain why one entity landed where it did
    #[command(group(
        ArgGroup::new("source")
            .args(["sessions", "assignments"])
            .required(true)
    ))]
    Why {
        id: String,
        #[arg(long)]
        sessions: Option<PathBuf>,
        #[arg(long)]
        assignments: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = run_context(&cli)?;

    match cli.command {
        Commands::Sessions { file, json } => handlers::sessions::handle(&file, json, &ctx),
        Commands::Assignments { file, tab, json } => {
            handlers::assignments::handle(&file, tab, json, &ctx)
        }
        Commands::Board {
            sessions,
            assignments,
            json,
        } => handlers::board::handle(&sessions, &assignments, json, &ctx),
        Commands::Why {
            id,
            sessions,
            assignments,
        } => match (sessions, assignments) {
            (Some(file), _) => handlers::why::handle_session(&file, &id, &ctx),
            (None, Some(file)) => handlers::why::handle_assignment(&file, &id, &ctx),
            (None, None) => unreachable!("clap enforces the source group"),
        },
    }
}

/// Builds the config and samples `now` exactly once for this invocation.
fn run_context(cli: &Cli) -> Result<RunContext> {
    if cli.default_duration <= 0 {
        bail!("--default-duration must be positive, got {}", cli.default_duration);
    }

    let config = EngineConfig {
        default_duration_minutes: cli.default_duration,
        utc_offset: cli.utc_offset.unwrap_or_else(utc_offset),
    };
    let clock: Box<dyn Clock> = match cli.now {
        Some(at) => Box::new(FixedClock(at)),
        None => Box::new(SystemClock),
    };
    let now = config.sample_now(clock.as_ref());
    tracing::debug!(at = %now.instant(), offset = %now.offset(), "sampled now");

    Ok(RunContext { config, now })
}

fn parse_now(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_instant(raw).ok_or_else(|| format!("'{raw}' is not an RFC 3339 or zone-less instant"))
}

fn parse_offset(raw: &str) -> Result<FixedOffset, String> {
    parse_utc_offset(raw).ok_or_else(|| format!("'{raw}' is not a UTC offset like +02:00"))
}
