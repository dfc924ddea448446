//! Handler for the `sessions` command.

use super::{load, local_time, print_header, print_warnings, RunContext};
use anyhow::Result;
use classboard::engine::clock::Now;
use classboard::engine::error::Warning;
use classboard::engine::sessions::{
    classify_with, next_session, AttendanceSummary, ScheduledSession, SessionBuckets, SessionPhase,
};
use classboard::engine::types::Session;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

/// Buckets a session snapshot and prints the result.
///
/// # Errors
/// Returns error if the snapshot cannot be read or is not a JSON array.
pub fn handle(file: &Path, json: bool, ctx: &RunContext) -> Result<()> {
    let decoded = load::<Session>(file, "sessions")?;
    let buckets = classify_with(&decoded.records, &ctx.now, &ctx.config);
    let attendance = AttendanceSummary::from_past(&buckets.past);

    let mut warnings = decoded.warnings;
    warnings.extend(buckets.warnings.iter().cloned());

    if json {
        return print_json(&ctx.now, &buckets, attendance, &warnings);
    }

    print_human(&ctx.now, &buckets, attendance);
    print_warnings(&warnings);
    Ok(())
}

#[derive(Serialize)]
struct SessionsReport<'a> {
    now: &'a Now,
    ongoing: &'a [ScheduledSession],
    today: &'a [ScheduledSession],
    upcoming: &'a [ScheduledSession],
    past: &'a [ScheduledSession],
    next: Option<&'a ScheduledSession>,
    attendance: AttendanceSummary,
    warnings: &'a [Warning],
}

fn print_json(
    now: &Now,
    buckets: &SessionBuckets,
    attendance: AttendanceSummary,
    warnings: &[Warning],
) -> Result<()> {
    let report = SessionsReport {
        now,
        ongoing: &buckets.ongoing,
        today: &buckets.today,
        upcoming: &buckets.upcoming,
        past: &buckets.past,
        next: next_session(buckets),
        attendance,
        warnings,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(super) fn print_human(now: &Now, buckets: &SessionBuckets, attendance: AttendanceSummary) {
    println!("{} Live Sessions", "🎓".cyan());
    print_header(now);

    // Ongoing takes visual priority; today only lists what is not live.
    print_bucket("Live now", &buckets.ongoing, now);
    let today_rest: Vec<_> = buckets
        .today
        .iter()
        .filter(|s| s.phase != SessionPhase::Ongoing)
        .cloned()
        .collect();
    print_bucket("Today", &today_rest, now);
    print_bucket("Upcoming", &buckets.upcoming, now);
    print_bucket("Past", &buckets.past, now);

    if let Some(next) = next_session(buckets) {
        println!(
            "\n   {} [{}] at {}",
            "Next up:".bold(),
            next.session.label().yellow(),
            local_time(now, next.starts_at)
        );
    }

    if let Some(rate) = attendance.attendance_rate() {
        println!(
            "   {} {:.0}% ({} present, {} late, {} absent, {} unmarked)",
            "Attendance:".bold(),
            rate * 100.0,
            attendance.present,
            attendance.late,
            attendance.absent,
            attendance.unmarked
        );
    }
}

fn print_bucket(title: &str, sessions: &[ScheduledSession], now: &Now) {
    println!("\n   {} ({})", title.bold(), sessions.len());
    if sessions.is_empty() {
        println!("     {}", "(none)".dimmed());
        return;
    }

    for s in sessions {
        let mark = s
            .session
            .attendance_status
            .map(|a| format!(" · {a}"))
            .unwrap_or_default();
        println!(
            "     {} [{}] {} → {}{}",
            phase_icon(s.phase),
            s.session.label().yellow(),
            local_time(now, s.starts_at),
            local_time(now, s.ends_at),
            mark.dimmed()
        );
    }
}

pub(super) fn phase_icon(phase: SessionPhase) -> colored::ColoredString {
    match phase {
        SessionPhase::Ongoing => "●".green(),
        SessionPhase::NotStarted => "○".dimmed(),
        SessionPhase::Ended => "✓".blue(),
    }
}
