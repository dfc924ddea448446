//! Core entity types as the REST collaborators hand them over.
//!
//! Timestamps stay as raw text here. Parsing happens inside the classifiers
//! so a bad stamp degrades one record instead of failing the whole payload.
//! Derived lifecycle state lives in `sessions.rs` and `assignments.rs`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Opaque identifier. APIs send either strings or numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Uint(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Int(n) => Self(n.to_string()),
            Raw::Uint(n) => Self(n.to_string()),
        })
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Reads a timestamp field as raw text whatever its JSON type.
///
/// `null` becomes empty, numbers keep their digits. The classifiers then
/// report the value as malformed instead of the record failing to decode.
fn raw_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Reads a point total, falling back to 0 for `null` or non-numeric values.
fn lenient_points<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let points = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(points.filter(|p| p.is_finite()).unwrap_or(0.0))
}

/// Attendance mark attached after a session has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[serde(alias = "PRESENT", alias = "present")]
    Present,
    #[serde(alias = "LATE", alias = "late")]
    Late,
    #[serde(alias = "ABSENT", alias = "absent")]
    Absent,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "PRESENT"),
            Self::Late => write!(f, "LATE"),
            Self::Absent => write!(f, "ABSENT"),
        }
    }
}

/// One live class occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// RFC 3339 instant; an empty or unparsable value skips the session.
    #[serde(default, deserialize_with = "raw_text")]
    pub scheduled_at: String,
    /// Absent means the configured default (60 minutes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_status: Option<AttendanceStatus>,
}

impl Session {
    #[must_use]
    pub fn new(id: &str, scheduled_at: &str, duration_minutes: Option<i64>) -> Self {
        Self {
            id: EntityId::from(id),
            title: None,
            scheduled_at: scheduled_at.to_string(),
            duration_minutes,
            attendance_status: None,
        }
    }

    #[must_use]
    pub fn with_attendance(mut self, status: AttendanceStatus) -> Self {
        self.attendance_status = Some(status);
        self
    }

    /// Display label: title when known, id otherwise.
    #[must_use]
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id.0)
    }
}

/// The viewer's single completion record for an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Optional at this layer so corrupt records still decode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    /// Presence alone means the work has been evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl Submission {
    #[must_use]
    pub fn submitted(at: &str) -> Self {
        Self {
            submitted_at: Some(at.to_string()),
            grade: None,
            feedback: None,
        }
    }

    #[must_use]
    pub fn graded(mut self, grade: f64) -> Self {
        self.grade = Some(grade);
        self
    }

    #[must_use]
    pub fn is_graded(&self) -> bool {
        self.grade.is_some()
    }

    /// Grade as a percentage of `points_total`.
    ///
    /// `None` when ungraded or when the assignment carries no points.
    #[must_use]
    pub fn score_percent(&self, points_total: f64) -> Option<f64> {
        let grade = self.grade?;
        if points_total <= 0.0 {
            return None;
        }
        Some(grade / points_total * 100.0)
    }
}

/// One gradable task with a single deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "raw_text")]
    pub due_date: String,
    #[serde(default, deserialize_with = "lenient_points")]
    pub points_total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_submission: Option<Submission>,
}

impl Assignment {
    #[must_use]
    pub fn new(id: &str, due_date: &str) -> Self {
        Self {
            id: EntityId::from(id),
            title: None,
            due_date: due_date.to_string(),
            points_total: 100.0,
            my_submission: None,
        }
    }

    #[must_use]
    pub fn with_submission(mut self, submission: Submission) -> Self {
        self.my_submission = Some(submission);
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id.0)
    }

    /// Shortcut for `my_submission.score_percent(points_total)`.
    #[must_use]
    pub fn score_percent(&self) -> Option<f64> {
        self.my_submission
            .as_ref()
            .and_then(|s| s.score_percent(self.points_total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_decodes_camel_case() {
        let json = r#"{
            "id": 42,
            "scheduledAt": "2024-05-01T10:00:00Z",
            "durationMinutes": 45,
            "attendanceStatus": "LATE"
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.id, EntityId::from("42"));
        assert_eq!(session.duration_minutes, Some(45));
        assert_eq!(session.attendance_status, Some(AttendanceStatus::Late));
    }

    #[test]
    fn test_session_missing_fields_default() {
        let session: Session = serde_json::from_str(r#"{"id": "s1"}"#).unwrap();
        assert_eq!(session.scheduled_at, "");
        assert_eq!(session.duration_minutes, None);
        assert_eq!(session.label(), "s1");
    }

    #[test]
    fn test_null_and_numeric_stamps_decode_as_raw_text() {
        let session: Session =
            serde_json::from_str(r#"{"id": "s1", "scheduledAt": null}"#).unwrap();
        assert_eq!(session.scheduled_at, "");

        let a: Assignment =
            serde_json::from_str(r#"{"id": "a1", "dueDate": 1714557600000}"#).unwrap();
        assert_eq!(a.due_date, "1714557600000");
    }

    #[test]
    fn test_points_total_falls_back_to_zero() {
        for raw in ["null", "\"ten\"", "true"] {
            let json = format!(r#"{{"id": "a1", "pointsTotal": {raw}}}"#);
            let a: Assignment = serde_json::from_str(&json).unwrap();
            assert_eq!(a.points_total, 0.0, "pointsTotal {raw}");
        }
        let a: Assignment = serde_json::from_str(r#"{"id": "a1", "pointsTotal": "25"}"#).unwrap();
        assert_eq!(a.points_total, 25.0);
    }

    #[test]
    fn test_assignment_decodes_submission() {
        let json = r#"{
            "id": "a1",
            "title": "Essay",
            "dueDate": "2024-05-01T10:00:00Z",
            "pointsTotal": 50,
            "mySubmission": { "submittedAt": "2024-04-30T09:00:00Z", "grade": 40 }
        }"#;
        let a: Assignment = serde_json::from_str(json).unwrap();
        assert_eq!(a.label(), "Essay");
        let sub = a.my_submission.as_ref().unwrap();
        assert!(sub.is_graded());
        assert_eq!(a.score_percent(), Some(80.0));
    }

    #[test]
    fn test_score_percent_needs_grade_and_points() {
        let ungraded = Submission::submitted("2024-04-30T09:00:00Z");
        assert_eq!(ungraded.score_percent(100.0), None);

        let graded = ungraded.graded(5.0);
        assert_eq!(graded.score_percent(0.0), None);
        assert_eq!(graded.score_percent(10.0), Some(50.0));
    }

    #[test]
    fn test_attendance_accepts_case_variants() {
        for raw in ["\"Present\"", "\"PRESENT\"", "\"present\""] {
            let s: AttendanceStatus = serde_json::from_str(raw).unwrap();
            assert_eq!(s, AttendanceStatus::Present);
        }
    }
}
