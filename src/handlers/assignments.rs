//! Handler for the `assignments` command.

use super::{load, local_time, print_header, print_warnings, RunContext};
use anyhow::Result;
use classboard::engine::assignments::{
    resolve_all, AssignmentCounts, AssignmentStatus, AssignmentTab, AssignmentWithStatus,
    ResolvedAssignments,
};
use classboard::engine::clock::Now;
use classboard::engine::error::Warning;
use classboard::engine::types::Assignment;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

/// Resolves a snapshot and prints one tab of it.
///
/// # Errors
/// Returns error if the snapshot cannot be read or is not a JSON array.
pub fn handle(file: &Path, tab: AssignmentTab, json: bool, ctx: &RunContext) -> Result<()> {
    let decoded = load::<Assignment>(file, "assignments")?;
    let resolved = resolve_all(&decoded.records, &ctx.now);

    let mut warnings = decoded.warnings;
    warnings.extend(resolved.warnings.iter().cloned());

    if json {
        return print_json(&ctx.now, &resolved, tab, &warnings);
    }

    print_human(&ctx.now, &resolved, tab);
    print_warnings(&warnings);
    Ok(())
}

#[derive(Serialize)]
struct AssignmentsReport<'a> {
    now: &'a Now,
    tab: AssignmentTab,
    counts: AssignmentCounts,
    items: Vec<&'a AssignmentWithStatus>,
    warnings: &'a [Warning],
}

fn print_json(
    now: &Now,
    resolved: &ResolvedAssignments,
    tab: AssignmentTab,
    warnings: &[Warning],
) -> Result<()> {
    let report = AssignmentsReport {
        now,
        tab,
        counts: resolved.counts(),
        items: resolved.tab(tab),
        warnings,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(super) fn print_human(now: &Now, resolved: &ResolvedAssignments, tab: AssignmentTab) {
    let counts = resolved.counts();
    println!("{} Assignments [{}]", "📝".cyan(), tab.to_string().bold());
    print_header(now);
    println!(
        "   {} pending · {} overdue · {} submitted · {} graded",
        counts.pending,
        counts.overdue.to_string().red(),
        counts.submitted,
        counts.graded.to_string().green()
    );

    let items = resolved.tab(tab);
    if items.is_empty() {
        println!("\n   {}", "(nothing in this tab)".dimmed());
        return;
    }

    println!();
    for item in items {
        let due = item
            .due_at
            .map_or_else(|| "due ?".to_string(), |d| format!("due {}", local_time(now, d)));
        let score = item
            .assignment
            .score_percent()
            .map(|p| format!(" · {p:.0}%"))
            .unwrap_or_default();
        println!(
            "   {} {:<9} [{}] {}{}",
            status_icon(item.status),
            item.status.to_string(),
            item.assignment.label().yellow(),
            due.dimmed(),
            score
        );
    }
}

pub(super) fn status_icon(status: AssignmentStatus) -> colored::ColoredString {
    match status {
        AssignmentStatus::Pending => "○".dimmed(),
        AssignmentStatus::Overdue => "✗".red(),
        AssignmentStatus::Submitted => "↑".yellow(),
        AssignmentStatus::Graded => "✓".green(),
    }
}
