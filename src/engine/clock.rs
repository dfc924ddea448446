//! Now Sampling: the single instant shared by one classification pass.
//!
//! The classifiers never read a clock. A caller samples `Now` once per
//! render/refresh and hands the same value to every classifier, so two
//! widgets on one screen cannot disagree about a boundary session.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Serialize, Serializer};

/// Anything that can report the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant. Used by tests and `--now`.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// One sampled instant plus the viewer's UTC offset.
///
/// The offset only matters for calendar-day questions ("is this today?").
/// Every ordering comparison uses the UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Now {
    at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_offset")]
    offset: FixedOffset,
}

impl Now {
    /// Samples the clock exactly once.
    #[must_use]
    pub fn sample(clock: &dyn Clock, offset: FixedOffset) -> Self {
        Self {
            at: clock.now(),
            offset,
        }
    }

    /// A `Now` at the given instant, viewed from UTC.
    #[must_use]
    pub fn at(at: DateTime<Utc>) -> Self {
        Self {
            at,
            offset: utc_offset(),
        }
    }

    #[must_use]
    pub fn with_offset(self, offset: FixedOffset) -> Self {
        Self { offset, ..self }
    }

    #[must_use]
    pub fn instant(&self) -> DateTime<Utc> {
        self.at
    }

    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The viewer's current calendar day.
    #[must_use]
    pub fn local_day(&self) -> NaiveDate {
        self.day_of(self.at)
    }

    /// The viewer's calendar day on which `instant` falls.
    #[must_use]
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Midnight-to-midnight comparison in the viewer's offset.
    #[must_use]
    pub fn is_same_day(&self, instant: DateTime<Utc>) -> bool {
        self.day_of(instant) == self.local_day()
    }
}

/// The zero offset.
#[must_use]
pub fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Parses `Z`, `UTC`, `+HH`, `+HHMM` or `+HH:MM` (and the `-` forms).
#[must_use]
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Some(utc_offset());
    }

    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes) = match digits.len() {
        1 | 2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn serialize_offset<S: Serializer>(offset: &FixedOffset, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(offset)
}
