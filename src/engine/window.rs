//! Time primitives: session windows, assignment deadlines, timestamp parsing.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Layouts accepted when the payload omits a zone. Such stamps are read as UTC.
const NAIVE_LAYOUTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses an instant from API text.
///
/// RFC 3339 is the primary format. Zone-less stamps are accepted and read
/// as UTC. Returns `None` for anything else; callers turn that into a
/// warning rather than an error.
#[must_use]
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .map(|naive| naive.and_utc())
}

/// A `(start, duration)` pair with a precomputed end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Builds a window; `None` when `minutes` is not positive.
    #[must_use]
    pub fn new(start: DateTime<Utc>, minutes: i64) -> Option<Self> {
        if minutes <= 0 {
            return None;
        }
        let end = Duration::try_minutes(minutes)
            .and_then(|d| start.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Some(Self { start, end })
    }

    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Closed on both ends: the start and end instants are inside.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    #[must_use]
    pub fn starts_after(&self, instant: DateTime<Utc>) -> bool {
        self.start > instant
    }

    #[must_use]
    pub fn ended_before(&self, instant: DateTime<Utc>) -> bool {
        self.end < instant
    }
}

/// A single due instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    due: DateTime<Utc>,
}

impl Deadline {
    #[must_use]
    pub fn new(due: DateTime<Utc>) -> Self {
        Self { due }
    }

    #[must_use]
    pub fn due(&self) -> DateTime<Utc> {
        self.due
    }

    /// Strict: a deadline equal to `instant` has not passed yet.
    #[must_use]
    pub fn has_passed(&self, instant: DateTime<Utc>) -> bool {
        self.due < instant
    }
}
