//! List Re-evaluation Hook: memoized buckets for a dashboard.
//!
//! `Board` holds the latest fetched snapshots. Every evaluation is keyed by
//! `(generation, now)`: replacing a snapshot bumps the generation, sampling
//! a new `now` changes the other half. Same key, same `Evaluation`, no
//! recomputation.

use super::assignments::{resolve_all, AssignmentCounts, ResolvedAssignments};
use super::clock::{Clock, Now};
use super::config::EngineConfig;
use super::sessions::{classify_with, next_session, AttendanceSummary, ScheduledSession, SessionBuckets};
use super::types::{Assignment, Session};
use serde::Serialize;

/// Everything one render needs, computed against a single `now`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub now: Now,
    pub sessions: SessionBuckets,
    pub assignments: ResolvedAssignments,
    pub assignment_counts: AssignmentCounts,
    pub attendance: AttendanceSummary,
}

impl Evaluation {
    /// Runs both classifiers with the same `now`.
    #[must_use]
    pub fn compute(
        sessions: &[Session],
        assignments: &[Assignment],
        now: Now,
        config: &EngineConfig,
    ) -> Self {
        let session_buckets = classify_with(sessions, &now, config);
        let resolved = resolve_all(assignments, &now);
        Self {
            now,
            assignment_counts: resolved.counts(),
            attendance: AttendanceSummary::from_past(&session_buckets.past),
            sessions: session_buckets,
            assignments: resolved,
        }
    }

    #[must_use]
    pub fn next_session(&self) -> Option<&ScheduledSession> {
        next_session(&self.sessions)
    }

    /// Total non-fatal diagnostics across both lists.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.sessions.warnings.len() + self.assignments.warnings.len()
    }
}

struct Memo {
    generation: u64,
    evaluation: Evaluation,
}

/// Snapshot holder with a one-slot evaluation cache.
pub struct Board {
    config: EngineConfig,
    sessions: Vec<Session>,
    assignments: Vec<Assignment>,
    generation: u64,
    memo: Option<Memo>,
    passes: u64,
}

impl Board {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sessions: Vec::new(),
            assignments: Vec::new(),
            generation: 0,
            memo: None,
            passes: 0,
        }
    }

    /// Replaces the session snapshot (a fresh fetch).
    pub fn set_sessions(&mut self, sessions: Vec<Session>) {
        self.sessions = sessions;
        self.generation += 1;
    }

    /// Replaces the assignment snapshot (a fresh fetch).
    pub fn set_assignments(&mut self, assignments: Vec<Assignment>) {
        self.assignments = assignments;
        self.generation += 1;
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// How many times the classifiers actually ran.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Last evaluation, if any, without recomputing.
    #[must_use]
    pub fn cached(&self) -> Option<&Evaluation> {
        self.memo.as_ref().map(|m| &m.evaluation)
    }

    /// Evaluates against `now`, reusing the memo when nothing changed.
    pub fn evaluate(&mut self, now: Now) -> &Evaluation {
        let generation = self.generation;
        let stale = self
            .memo
            .as_ref()
            .map_or(true, |m| m.generation != generation || m.evaluation.now != now);
        if stale {
            self.memo = None;
        }

        let (sessions, assignments, config) = (&self.sessions, &self.assignments, &self.config);
        let passes = &mut self.passes;
        let memo = self.memo.get_or_insert_with(|| {
            *passes += 1;
            tracing::debug!(generation, at = %now.instant(), "re-evaluating board");
            Memo {
                generation,
                evaluation: Evaluation::compute(sessions, assignments, now, config),
            }
        });
        &memo.evaluation
    }

    /// Samples `now` once from `clock`, then evaluates.
    pub fn refresh(&mut self, clock: &dyn Clock) -> &Evaluation {
        let now = self.config.sample_now(clock);
        self.evaluate(now)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
