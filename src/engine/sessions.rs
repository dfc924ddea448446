//! Session Classifier: buckets live sessions relative to a sampled now.
//!
//! Every session gets exactly one `SessionPhase` on the time axis
//! (not started, ongoing, ended). The "today" flag is computed separately
//! from the viewer's calendar day, so a session can be both today and past.
//!
//! Pure: no clock reads, no I/O. Sample `Now` once and pass it to every
//! call made for one render.

use super::clock::Now;
use super::config::EngineConfig;
use super::error::{Warning, WarningKind};
use super::types::{AttendanceStatus, Session};
use super::window::{parse_instant, TimeWindow};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Where a session sits on the time axis at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Starts later than now - not joinable yet
    NotStarted,
    /// Running now, both the start and the end instant included
    Ongoing,
    /// Finished strictly before now - attendance may be marked
    Ended,
}

impl SessionPhase {
    /// Computes the phase. Boundaries belong to `Ongoing`.
    #[must_use]
    pub fn at(window: &TimeWindow, now: DateTime<Utc>) -> Self {
        if window.starts_after(now) {
            SessionPhase::NotStarted
        } else if window.ended_before(now) {
            SessionPhase::Ended
        } else {
            SessionPhase::Ongoing
        }
    }

    /// Returns the display color hint for UI rendering.
    #[must_use]
    pub fn color_hint(&self) -> &'static str {
        match self {
            SessionPhase::NotStarted => "gray",
            SessionPhase::Ongoing => "green",
            SessionPhase::Ended => "blue",
        }
    }

    /// True when a "join" action makes sense.
    #[must_use]
    pub fn is_joinable(&self) -> bool {
        matches!(self, SessionPhase::Ongoing)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::NotStarted => write!(f, "NOT STARTED"),
            SessionPhase::Ongoing => write!(f, "ONGOING"),
            SessionPhase::Ended => write!(f, "ENDED"),
        }
    }
}

/// A session with its window and phase pre-computed for one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSession {
    #[serde(flatten)]
    pub session: Session,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub phase: SessionPhase,
    pub is_today: bool,
}

/// The four buckets plus whatever was skipped.
///
/// Buckets keep input order. `ongoing`, `upcoming` and `past` never share a
/// session; `today` overlaps freely with all three.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionBuckets {
    pub ongoing: Vec<ScheduledSession>,
    pub today: Vec<ScheduledSession>,
    pub upcoming: Vec<ScheduledSession>,
    pub past: Vec<ScheduledSession>,
    pub warnings: Vec<Warning>,
}

impl SessionBuckets {
    /// Number of sessions left out of every bucket.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.warnings.iter().filter(|w| w.is_skip()).count()
    }

    /// Number of sessions that made it into the time-axis buckets.
    #[must_use]
    pub fn classified(&self) -> usize {
        self.ongoing.len() + self.upcoming.len() + self.past.len()
    }
}

/// Builds the window for one session, applying the default duration once.
///
/// # Errors
/// Returns the warning kind when the session cannot be placed on the axis.
pub fn window_for(session: &Session, default_minutes: i64) -> Result<TimeWindow, WarningKind> {
    let start = parse_instant(&session.scheduled_at).ok_or_else(|| {
        WarningKind::MalformedScheduledAt {
            raw: session.scheduled_at.clone(),
        }
    })?;
    let minutes = session.duration_minutes.unwrap_or(default_minutes);
    TimeWindow::new(start, minutes).ok_or(WarningKind::NonPositiveDuration { minutes })
}

/// Places one session for this pass.
///
/// # Errors
/// Returns a warning when the session has to be skipped.
pub fn schedule(
    session: &Session,
    now: &Now,
    config: &EngineConfig,
) -> Result<ScheduledSession, Warning> {
    let window = window_for(session, config.default_duration_minutes)
        .map_err(|kind| Warning::new(session.id.to_string(), kind))?;

    Ok(ScheduledSession {
        session: session.clone(),
        starts_at: window.start(),
        ends_at: window.end(),
        phase: SessionPhase::at(&window, now.instant()),
        is_today: now.is_same_day(window.start()),
    })
}

/// Classifies with the default configuration.
#[must_use]
pub fn classify(sessions: &[Session], now: &Now) -> SessionBuckets {
    classify_with(sessions, now, &EngineConfig::default())
}

/// Partitions `sessions` into buckets relative to `now`.
///
/// Never fails per record: bad sessions are skipped and reported in
/// `warnings`.
#[must_use]
pub fn classify_with(sessions: &[Session], now: &Now, config: &EngineConfig) -> SessionBuckets {
    let mut buckets = SessionBuckets::default();

    for session in sessions {
        let scheduled = match schedule(session, now, config) {
            Ok(s) => s,
            Err(warning) => {
                warning.log();
                buckets.warnings.push(warning);
                continue;
            }
        };

        if scheduled.is_today {
            buckets.today.push(scheduled.clone());
        }
        match scheduled.phase {
            SessionPhase::Ongoing => buckets.ongoing.push(scheduled),
            SessionPhase::NotStarted => buckets.upcoming.push(scheduled),
            SessionPhase::Ended => buckets.past.push(scheduled),
        }
    }

    tracing::debug!(
        ongoing = buckets.ongoing.len(),
        today = buckets.today.len(),
        upcoming = buckets.upcoming.len(),
        past = buckets.past.len(),
        skipped = buckets.skipped(),
        "classified sessions"
    );
    buckets
}

/// The soonest upcoming session; ties go to the earlier input position.
#[must_use]
pub fn next_session(buckets: &SessionBuckets) -> Option<&ScheduledSession> {
    buckets.upcoming.iter().min_by_key(|s| s.starts_at)
}

/// Attendance marks over ended sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    pub unmarked: usize,
}

impl AttendanceSummary {
    /// Tallies the `past` bucket.
    #[must_use]
    pub fn from_past(past: &[ScheduledSession]) -> Self {
        let mut summary = Self::default();
        for s in past {
            match s.session.attendance_status {
                Some(AttendanceStatus::Present) => summary.present += 1,
                Some(AttendanceStatus::Late) => summary.late += 1,
                Some(AttendanceStatus::Absent) => summary.absent += 1,
                None => summary.unmarked += 1,
            }
        }
        summary
    }

    #[must_use]
    pub fn marked(&self) -> usize {
        self.present + self.late + self.absent
    }

    /// Share of marked sessions attended (late counts as attended).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn attendance_rate(&self) -> Option<f64> {
        let marked = self.marked();
        if marked == 0 {
            return None;
        }
        Some((self.present + self.late) as f64 / marked as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clock::parse_utc_offset;
    use chrono::{Duration, TimeZone};

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0).unwrap()
    }

    fn make_session(id: &str, start: DateTime<Utc>, minutes: Option<i64>) -> Session {
        Session::new(id, &start.to_rfc3339(), minutes)
    }

    fn ids(bucket: &[ScheduledSession]) -> Vec<&str> {
        bucket.iter().map(|s| s.session.id.0.as_str()).collect()
    }

    #[test]
    fn test_ongoing_midway() {
        let s = make_session("a", t(), Some(60));
        let b = classify(&[s], &Now::at(t() + Duration::minutes(30)));
        assert_eq!(ids(&b.ongoing), vec!["a"]);
        assert!(b.past.is_empty());
        assert!(b.upcoming.is_empty());
    }

    #[test]
    fn test_past_after_end() {
        let s = make_session("a", t(), Some(60));
        let b = classify(&[s], &Now::at(t() + Duration::minutes(61)));
        assert_eq!(ids(&b.past), vec!["a"]);
        assert!(b.ongoing.is_empty());
    }

    #[test]
    fn test_start_boundary_is_ongoing_not_upcoming() {
        let s = make_session("a", t(), Some(60));
        let b = classify(&[s], &Now::at(t()));
        assert_eq!(ids(&b.ongoing), vec!["a"]);
        assert!(b.upcoming.is_empty());
    }

    #[test]
    fn test_end_boundary_is_ongoing_not_past() {
        let s = make_session("a", t(), Some(60));
        let b = classify(&[s], &Now::at(t() + Duration::minutes(60)));
        assert_eq!(ids(&b.ongoing), vec!["a"]);
        assert!(b.past.is_empty());
    }

    #[test]
    fn test_missing_duration_defaults_to_sixty() {
        let s = make_session("a", t(), None);
        let at_60 = classify(std::slice::from_ref(&s), &Now::at(t() + Duration::minutes(60)));
        assert_eq!(ids(&at_60.ongoing), vec!["a"]);
        let at_61 = classify(&[s], &Now::at(t() + Duration::minutes(61)));
        assert_eq!(ids(&at_61.past), vec!["a"]);
    }

    #[test]
    fn test_configured_default_duration() {
        let s = make_session("a", t(), None);
        let config = EngineConfig {
            default_duration_minutes: 90,
            ..EngineConfig::default()
        };
        let b = classify_with(&[s], &Now::at(t() + Duration::minutes(75)), &config);
        assert_eq!(ids(&b.ongoing), vec!["a"]);
    }

    #[test]
    fn test_exactly_one_phase_across_the_axis() {
        let s = make_session("a", t(), Some(30));
        for offset in -5..=40 {
            let now = Now::at(t() + Duration::minutes(offset));
            let b = classify(std::slice::from_ref(&s), &now);
            let hits = b.ongoing.len() + b.upcoming.len() + b.past.len();
            assert_eq!(hits, 1, "offset {offset} landed in {hits} buckets");
        }
    }

    #[test]
    fn test_today_overlaps_with_past() {
        let morning = make_session("morning", t() - Duration::hours(5), Some(60));
        let b = classify(&[morning], &Now::at(t()));
        assert_eq!(ids(&b.today), vec!["morning"]);
        assert_eq!(ids(&b.past), vec!["morning"]);
    }

    #[test]
    fn test_today_is_calendar_day_not_rolling() {
        // 15:00 yesterday is within 24h but not today.
        let yesterday = make_session("y", t() - Duration::hours(23), Some(60));
        let tomorrow = make_session("tm", t() + Duration::hours(11), Some(60));
        let later = make_session("later", t() + Duration::hours(9), Some(60));
        let b = classify(&[yesterday, tomorrow, later], &Now::at(t()));
        assert_eq!(ids(&b.today), vec!["later"]);
        assert_eq!(ids(&b.upcoming), vec!["tm", "later"]);
    }

    #[test]
    fn test_today_respects_viewer_offset() {
        let late = make_session("late", Utc.with_ymd_and_hms(2024, 6, 3, 23, 0, 0).unwrap(), Some(60));

        // 00:30 UTC on June 4th: the session was yesterday in UTC...
        let after_midnight = Utc.with_ymd_and_hms(2024, 6, 4, 0, 30, 0).unwrap();
        let in_utc = classify(std::slice::from_ref(&late), &Now::at(after_midnight));
        assert!(in_utc.today.is_empty());

        // ...but at +03:00 both instants fall on June 4th.
        let east = Now::at(after_midnight).with_offset(parse_utc_offset("+03:00").unwrap());
        let b = classify(std::slice::from_ref(&late), &east);
        assert_eq!(ids(&b.today), vec!["late"]);

        // 03:00 UTC on June 3rd is still June 2nd at -05:00.
        let early = make_session("early", Utc.with_ymd_and_hms(2024, 6, 3, 3, 0, 0).unwrap(), Some(60));
        let west = Now::at(t()).with_offset(parse_utc_offset("-05:00").unwrap());
        let b = classify(&[early], &west);
        assert!(b.today.is_empty());
    }

    #[test]
    fn test_preserves_input_order() {
        let sessions = vec![
            make_session("c", t() + Duration::hours(3), Some(60)),
            make_session("a", t() + Duration::hours(1), Some(60)),
            make_session("b", t() + Duration::hours(2), Some(60)),
        ];
        let b = classify(&sessions, &Now::at(t()));
        assert_eq!(ids(&b.upcoming), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_malformed_timestamp_is_skipped_and_reported() {
        let sessions = vec![
            Session::new("bad", "not a date", Some(60)),
            make_session("ok", t(), Some(60)),
        ];
        let b = classify(&sessions, &Now::at(t()));
        assert_eq!(ids(&b.ongoing), vec!["ok"]);
        assert_eq!(b.skipped(), 1);
        assert_eq!(b.warnings[0].entity, "bad");
        assert!(matches!(
            b.warnings[0].kind,
            WarningKind::MalformedScheduledAt { .. }
        ));
    }

    #[test]
    fn test_null_scheduled_at_counts_as_skipped() {
        let json = r#"[{"id": "s1", "scheduledAt": null}]"#;
        let decoded = crate::engine::input::decode_sessions(json).unwrap();
        assert_eq!(decoded.records.len(), 1);

        let b = classify(&decoded.records, &Now::at(t()));
        assert_eq!(b.classified(), 0);
        assert_eq!(b.skipped(), 1);
        assert!(matches!(
            b.warnings[0].kind,
            WarningKind::MalformedScheduledAt { .. }
        ));
    }

    #[test]
    fn test_non_positive_duration_is_skipped() {
        let sessions = vec![make_session("zero", t(), Some(0)), make_session("neg", t(), Some(-10))];
        let b = classify(&sessions, &Now::at(t()));
        assert_eq!(b.classified(), 0);
        assert!(b.today.is_empty());
        assert_eq!(b.skipped(), 2);
    }

    #[test]
    fn test_idempotent() {
        let sessions = vec![
            make_session("a", t() - Duration::hours(2), Some(60)),
            make_session("b", t(), Some(60)),
            make_session("c", t() + Duration::hours(2), None),
        ];
        let now = Now::at(t() + Duration::minutes(10));
        assert_eq!(classify(&sessions, &now), classify(&sessions, &now));
    }

    #[test]
    fn test_next_session_picks_earliest_start() {
        let sessions = vec![
            make_session("late", t() + Duration::hours(5), Some(60)),
            make_session("soon", t() + Duration::hours(1), Some(60)),
            make_session("soon-too", t() + Duration::hours(1), Some(30)),
        ];
        let b = classify(&sessions, &Now::at(t()));
        assert_eq!(next_session(&b).map(|s| s.session.id.0.as_str()), Some("soon"));
        assert!(next_session(&SessionBuckets::default()).is_none());
    }

    #[test]
    fn test_attendance_summary() {
        let sessions = vec![
            make_session("p", t() - Duration::days(3), Some(60)).with_attendance(AttendanceStatus::Present),
            make_session("l", t() - Duration::days(2), Some(60)).with_attendance(AttendanceStatus::Late),
            make_session("x", t() - Duration::days(1), Some(60)).with_attendance(AttendanceStatus::Absent),
            make_session("u", t() - Duration::hours(4), Some(60)),
        ];
        let b = classify(&sessions, &Now::at(t()));
        let summary = AttendanceSummary::from_past(&b.past);
        assert_eq!(
            summary,
            AttendanceSummary {
                present: 1,
                late: 1,
                absent: 1,
                unmarked: 1
            }
        );
        let rate = summary.attendance_rate().unwrap();
        assert!((rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(AttendanceSummary::default().attendance_rate(), None);
    }

    #[test]
    fn test_phase_hints() {
        assert!(SessionPhase::Ongoing.is_joinable());
        assert!(!SessionPhase::Ended.is_joinable());
        assert_eq!(SessionPhase::NotStarted.color_hint(), "gray");
        assert_eq!(SessionPhase::Ended.to_string(), "ENDED");
    }
}
