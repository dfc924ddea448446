//! Engine configuration.

use super::clock::{utc_offset, Clock, Now};
use chrono::FixedOffset;

/// Session length assumed when a payload omits `durationMinutes`.
pub const DEFAULT_DURATION_MINUTES: i64 = 60;

/// Knobs shared by every classification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub default_duration_minutes: i64,
    /// Viewer offset used for the "today" bucket.
    pub utc_offset: FixedOffset,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
            utc_offset: utc_offset(),
        }
    }
}

impl EngineConfig {
    /// Samples `now` from `clock` in the configured viewer offset.
    #[must_use]
    pub fn sample_now(&self, clock: &dyn Clock) -> Now {
        Now::sample(clock, self.utc_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clock::{parse_utc_offset, FixedClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_duration_minutes, 60);
        assert_eq!(config.utc_offset, utc_offset());
    }

    #[test]
    fn test_sample_now_carries_offset() {
        let offset = parse_utc_offset("+09:00").unwrap();
        let config = EngineConfig {
            utc_offset: offset,
            ..EngineConfig::default()
        };
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = config.sample_now(&FixedClock(at));
        assert_eq!(now.instant(), at);
        assert_eq!(now.offset(), offset);
    }
}
