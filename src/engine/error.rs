//! Diagnostics: the hard input error and the non-fatal warning channel.
//!
//! Per-record problems never abort a pass. They surface as `Warning`s next
//! to the buckets so the caller decides whether to log or show them.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failures that reject a whole payload.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
}

/// What went wrong with a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// `scheduledAt` could not be parsed; the session was skipped.
    MalformedScheduledAt { raw: String },
    /// `durationMinutes` was zero or negative; the session was skipped.
    NonPositiveDuration { minutes: i64 },
    /// `dueDate` could not be parsed; the assignment defaulted to PENDING.
    MalformedDueDate { raw: String },
    /// The record itself could not be decoded and was dropped.
    Undecodable { reason: String },
}

/// A non-fatal, per-record diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Id of the offending record, or its position when no id was readable.
    pub entity: String,
    #[serde(flatten)]
    pub kind: WarningKind,
}

impl Warning {
    #[must_use]
    pub fn new(entity: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            entity: entity.into(),
            kind,
        }
    }

    /// True when the record was left out of every bucket.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        !matches!(self.kind, WarningKind::MalformedDueDate { .. })
    }

    pub(crate) fn log(&self) {
        tracing::warn!(entity = %self.entity, "{}", self.kind);
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedScheduledAt { raw } => {
                write!(f, "unparsable scheduledAt '{raw}', session skipped")
            }
            Self::NonPositiveDuration { minutes } => {
                write!(f, "durationMinutes {minutes} is not positive, session skipped")
            }
            Self::MalformedDueDate { raw } => {
                write!(f, "unparsable dueDate '{raw}', treated as PENDING")
            }
            Self::Undecodable { reason } => write!(f, "record dropped: {reason}"),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.entity, self.kind)
    }
}
