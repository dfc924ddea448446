//! Handler for the `why` command.

use super::assignments::status_icon;
use super::sessions::phase_icon;
use super::{load, local_time, RunContext};
use anyhow::{bail, Result};
use classboard::engine::assignments::{resolve_checked, AssignmentStatus};
use classboard::engine::clock::Now;
use classboard::engine::sessions::{schedule, ScheduledSession, SessionPhase};
use classboard::engine::types::{Assignment, Session};
use colored::Colorize;
use std::path::Path;

/// Explains the phase and buckets of one session.
///
/// # Errors
/// Returns error if the snapshot cannot be loaded or the id is unknown.
pub fn handle_session(file: &Path, id: &str, ctx: &RunContext) -> Result<()> {
    let decoded = load::<Session>(file, "sessions")?;
    let Some(session) = decoded.records.iter().find(|s| s.id.0 == id) else {
        bail!("No session with id '{id}' in {}", file.display());
    };

    let scheduled = match schedule(session, &ctx.now, &ctx.config) {
        Ok(s) => s,
        Err(warning) => {
            println!("{} [{}] {}", "✗".red(), id.cyan().bold(), "skipped".red());
            println!("{} {}", "reason:".red(), warning.kind);
            return Ok(());
        }
    };

    println!(
        "{} [{}] {}",
        phase_icon(scheduled.phase),
        scheduled.session.label().cyan().bold(),
        scheduled.phase
    );
    println!(
        "   Window:  {} → {}",
        local_time(&ctx.now, scheduled.starts_at),
        local_time(&ctx.now, scheduled.ends_at)
    );
    println!("   Now:     {}", local_time(&ctx.now, ctx.now.instant()).dimmed());
    if session.duration_minutes.is_none() {
        println!(
            "   {}",
            format!(
                "durationMinutes missing, assumed {}",
                ctx.config.default_duration_minutes
            )
            .dimmed()
        );
    }
    println!();
    explain_phase(&scheduled);
    explain_today(&scheduled, &ctx.now);
    Ok(())
}

fn explain_phase(s: &ScheduledSession) {
    match s.phase {
        SessionPhase::NotStarted => {
            println!("{} starts after now → {}", "reason:".yellow(), "upcoming".bold());
        }
        SessionPhase::Ongoing => println!(
            "{} start ≤ now ≤ end (both ends inclusive) → {}",
            "reason:".green(),
            "ongoing".bold()
        ),
        SessionPhase::Ended => {
            println!("{} ended before now → {}", "reason:".blue(), "past".bold());
        }
    }
}

fn explain_today(s: &ScheduledSession, now: &Now) {
    let day = now.day_of(s.starts_at);
    if s.is_today {
        println!("        also {} (starts on {day}, offset {})", "today".bold(), now.offset());
    } else {
        println!(
            "        {} (starts on {day}, viewer day is {})",
            "not today".dimmed(),
            now.local_day()
        );
    }
}

/// Explains which precedence rule decided an assignment's status.
///
/// # Errors
/// Returns error if the snapshot cannot be loaded or the id is unknown.
pub fn handle_assignment(file: &Path, id: &str, ctx: &RunContext) -> Result<()> {
    let decoded = load::<Assignment>(file, "assignments")?;
    let Some(assignment) = decoded.records.iter().find(|a| a.id.0 == id) else {
        bail!("No assignment with id '{id}' in {}", file.display());
    };

    let (status, warning) = resolve_checked(assignment, &ctx.now);

    println!(
        "{} [{}] {}",
        status_icon(status),
        assignment.label().cyan().bold(),
        status
    );
    println!("   Status:  {} ({})", status, status.color_hint().dimmed());
    println!("   Due:     {}", assignment.due_date.dimmed());
    println!();

    match status {
        AssignmentStatus::Graded => {
            let grade = assignment
                .my_submission
                .as_ref()
                .and_then(|s| s.grade)
                .unwrap_or_default();
            println!(
                "{} rule 1: a grade is present ({grade} / {}), deadline ignored.",
                "reason:".green(),
                assignment.points_total
            );
        }
        AssignmentStatus::Submitted => println!(
            "{} rule 2: submitted and awaiting a grade, deadline ignored.",
            "reason:".yellow()
        ),
        AssignmentStatus::Overdue => println!(
            "{} rule 3: nothing submitted and the deadline has passed.",
            "reason:".red()
        ),
        AssignmentStatus::Pending => println!(
            "{} rule 4: nothing submitted, deadline not passed yet.",
            "reason:".dimmed()
        ),
    }

    if let Some(w) = warning {
        println!("        {} {}", "note:".yellow(), w.kind);
    }
    Ok(())
}
