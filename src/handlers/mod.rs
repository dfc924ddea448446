//! Command handlers. Each one loads a snapshot, runs the engine with the
//! shared `RunContext`, and prints human or JSON output.

pub mod assignments;
pub mod board;
pub mod sessions;
pub mod why;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use classboard::engine::clock::Now;
use classboard::engine::config::EngineConfig;
use classboard::engine::error::Warning;
use classboard::engine::input::{load_list, Decoded};
use colored::Colorize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Config plus the single `now` sampled for this invocation.
pub struct RunContext {
    pub config: EngineConfig,
    pub now: Now,
}

/// Loads a snapshot file, attaching the path to any error.
pub fn load<T: DeserializeOwned>(path: &Path, what: &str) -> Result<Decoded<T>> {
    load_list(path).with_context(|| format!("Failed to load {what} from {}", path.display()))
}

/// Formats an instant in the viewer's offset.
pub fn local_time(now: &Now, instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&now.offset())
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

pub fn print_header(now: &Now) {
    println!(
        "   {} {}",
        "now:".dimmed(),
        format!("{} ({})", local_time(now, now.instant()), now.offset()).dimmed()
    );
}

pub fn print_warnings(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    println!("\n{} {} record(s) degraded:", "⚠".yellow(), warnings.len());
    for w in warnings {
        println!("   [{}] {}", w.entity.yellow(), w.kind.to_string().dimmed());
    }
}
