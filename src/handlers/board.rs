//! Handler for the `board` command.

use super::{load, print_warnings, RunContext};
use anyhow::Result;
use classboard::engine::assignments::AssignmentTab;
use classboard::engine::board::{Board, Evaluation};
use classboard::engine::error::Warning;
use classboard::engine::types::{Assignment, Session};
use serde::Serialize;
use std::path::Path;

/// Evaluates both snapshots against one `now`, the way a dashboard screen does.
///
/// # Errors
/// Returns error if either snapshot cannot be loaded.
pub fn handle(sessions: &Path, assignments: &Path, json: bool, ctx: &RunContext) -> Result<()> {
    let sessions = load::<Session>(sessions, "sessions")?;
    let assignments = load::<Assignment>(assignments, "assignments")?;

    let mut board = Board::new(ctx.config);
    board.set_sessions(sessions.records);
    board.set_assignments(assignments.records);
    let eval = board.evaluate(ctx.now);

    let mut warnings = sessions.warnings;
    warnings.extend(assignments.warnings);
    warnings.extend(eval.sessions.warnings.iter().cloned());
    warnings.extend(eval.assignments.warnings.iter().cloned());

    if json {
        return print_json(eval, &warnings);
    }

    super::sessions::print_human(&eval.now, &eval.sessions, eval.attendance);
    println!();
    super::assignments::print_human(&eval.now, &eval.assignments, AssignmentTab::All);
    print_warnings(&warnings);
    Ok(())
}

/// The evaluation plus every warning raised while loading or evaluating.
#[derive(Serialize)]
struct BoardReport<'a> {
    #[serde(flatten)]
    evaluation: &'a Evaluation,
    warnings: &'a [Warning],
}

fn print_json(evaluation: &Evaluation, warnings: &[Warning]) -> Result<()> {
    let report = BoardReport {
        evaluation,
        warnings,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
