//! Assignment Status Resolver: one status per assignment, first rule wins.
//!
//! Submission state dominates deadline state. A late-but-submitted or
//! late-but-graded assignment is never OVERDUE, so the order of
//! `PRECEDENCE` is the business rule and must not be rearranged.

use super::clock::Now;
use super::error::{Warning, WarningKind};
use super::types::Assignment;
use super::window::{parse_instant, Deadline};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The derived lifecycle status of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    /// Nothing submitted and the deadline has not passed, or is unknown
    Pending,
    /// Nothing submitted and the deadline has passed
    Overdue,
    /// Work handed in and waiting for a grade, whatever the deadline
    Submitted,
    /// A grade is recorded - final, whatever the deadline
    Graded,
}

impl AssignmentStatus {
    /// Returns the display color hint for UI rendering.
    #[must_use]
    pub fn color_hint(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "gray",
            AssignmentStatus::Overdue => "red",
            AssignmentStatus::Submitted => "amber",
            AssignmentStatus::Graded => "green",
        }
    }

    /// True while the learner still owes work.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        matches!(self, AssignmentStatus::Pending | AssignmentStatus::Overdue)
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentStatus::Pending => write!(f, "PENDING"),
            AssignmentStatus::Overdue => write!(f, "OVERDUE"),
            AssignmentStatus::Submitted => write!(f, "SUBMITTED"),
            AssignmentStatus::Graded => write!(f, "GRADED"),
        }
    }
}

/// What the rules look at, gathered once per assignment.
#[derive(Debug, Clone, Copy, Default)]
struct Facts {
    graded: bool,
    submitted: bool,
    past_due: bool,
}

type Rule = (AssignmentStatus, fn(&Facts) -> bool);

fn has_grade(f: &Facts) -> bool {
    f.graded
}

fn has_submission(f: &Facts) -> bool {
    f.submitted
}

fn is_past_due(f: &Facts) -> bool {
    f.past_due
}

fn always(_: &Facts) -> bool {
    true
}

/// Ordered decision table. The last row always matches.
const PRECEDENCE: [Rule; 4] = [
    (AssignmentStatus::Graded, has_grade),
    (AssignmentStatus::Submitted, has_submission),
    (AssignmentStatus::Overdue, is_past_due),
    (AssignmentStatus::Pending, always),
];

fn apply_rules(facts: &Facts) -> AssignmentStatus {
    PRECEDENCE
        .iter()
        .find(|(_, rule)| rule(facts))
        .map_or(AssignmentStatus::Pending, |(status, _)| *status)
}

/// Gathers facts once and runs the table. Also hands back the parsed deadline.
fn evaluate(assignment: &Assignment, now: &Now) -> (AssignmentStatus, Option<Deadline>) {
    let deadline = parse_instant(&assignment.due_date).map(Deadline::new);
    let submission = assignment.my_submission.as_ref();

    let facts = Facts {
        graded: submission.is_some_and(|s| s.is_graded()),
        submitted: submission.is_some(),
        past_due: deadline.is_some_and(|d| d.has_passed(now.instant())),
    };

    (apply_rules(&facts), deadline)
}

fn due_date_warning(assignment: &Assignment) -> Warning {
    Warning::new(
        assignment.id.to_string(),
        WarningKind::MalformedDueDate {
            raw: assignment.due_date.clone(),
        },
    )
}

/// Resolves the status and reports an unparsable deadline.
///
/// An unknown deadline is treated as not yet due, so it can never raise a
/// false "missed deadline".
#[must_use]
pub fn resolve_checked(assignment: &Assignment, now: &Now) -> (AssignmentStatus, Option<Warning>) {
    let (status, deadline) = evaluate(assignment, now);
    let warning = deadline.is_none().then(|| due_date_warning(assignment));
    (status, warning)
}

/// Resolves one assignment. Deadline problems are logged, not returned.
#[must_use]
pub fn resolve(assignment: &Assignment, now: &Now) -> AssignmentStatus {
    let (status, warning) = resolve_checked(assignment, now);
    if let Some(w) = warning {
        w.log();
    }
    status
}

/// An assignment annotated with its status for one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentWithStatus {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub status: AssignmentStatus,
    /// Parsed deadline; `None` when `dueDate` was unparsable.
    pub due_at: Option<DateTime<Utc>>,
}

/// The status-annotated list plus deadline warnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedAssignments {
    pub items: Vec<AssignmentWithStatus>,
    pub warnings: Vec<Warning>,
}

impl ResolvedAssignments {
    /// Derived view for one dashboard tab, in list order.
    #[must_use]
    pub fn tab(&self, tab: AssignmentTab) -> Vec<&AssignmentWithStatus> {
        self.items.iter().filter(|a| tab.includes(a.status)).collect()
    }

    #[must_use]
    pub fn counts(&self) -> AssignmentCounts {
        AssignmentCounts::tally(self.items.iter().map(|a| a.status))
    }
}

/// Resolves every assignment against the same `now`.
#[must_use]
pub fn resolve_all(assignments: &[Assignment], now: &Now) -> ResolvedAssignments {
    let mut resolved = ResolvedAssignments::default();

    for assignment in assignments {
        let (status, deadline) = evaluate(assignment, now);
        if deadline.is_none() {
            let w = due_date_warning(assignment);
            w.log();
            resolved.warnings.push(w);
        }
        resolved.items.push(AssignmentWithStatus {
            assignment: assignment.clone(),
            status,
            due_at: deadline.map(|d| d.due()),
        });
    }

    tracing::debug!(
        total = resolved.items.len(),
        warnings = resolved.warnings.len(),
        "resolved assignments"
    );
    resolved
}

/// Dashboard tabs over a resolved list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentTab {
    #[default]
    All,
    /// Work still owed: PENDING and OVERDUE.
    Pending,
    /// Work handed in: GRADED and SUBMITTED.
    Graded,
}

impl AssignmentTab {
    #[must_use]
    pub fn includes(&self, status: AssignmentStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status.is_actionable(),
            Self::Graded => !status.is_actionable(),
        }
    }
}

impl FromStr for AssignmentTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "graded" => Ok(Self::Graded),
            other => Err(format!("unknown tab '{other}' (expected all, pending or graded)")),
        }
    }
}

impl fmt::Display for AssignmentTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "ALL"),
            Self::Pending => write!(f, "PENDING"),
            Self::Graded => write!(f, "GRADED"),
        }
    }
}

/// Aggregate counts of assignments by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssignmentCounts {
    pub pending: usize,
    pub overdue: usize,
    pub submitted: usize,
    pub graded: usize,
}

impl AssignmentCounts {
    #[must_use]
    pub fn tally(statuses: impl IntoIterator<Item = AssignmentStatus>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            match status {
                AssignmentStatus::Pending => counts.pending += 1,
                AssignmentStatus::Overdue => counts.overdue += 1,
                AssignmentStatus::Submitted => counts.submitted += 1,
                AssignmentStatus::Graded => counts.graded += 1,
            }
        }
        counts
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.pending + self.overdue + self.submitted + self.graded
    }
}
