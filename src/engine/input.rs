//! Snapshot decoding: JSON collections as a REST collaborator returns them.
//!
//! The payload must be an array. Each element is decoded on its own; one
//! bad element becomes a warning and the rest still load.

use super::error::{EngineError, Warning, WarningKind};
use super::types::{Assignment, Session};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Decoded records plus the elements that had to be dropped.
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub warnings: Vec<Warning>,
}

/// Decodes a JSON array element by element.
///
/// # Errors
/// Returns `EngineError::Json` when the text is not JSON and
/// `EngineError::InvalidInput` when the top level is not an array.
pub fn decode_list<T: DeserializeOwned>(json: &str) -> Result<Decoded<T>, EngineError> {
    let value: Value = serde_json::from_str(json)?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(EngineError::InvalidInput(format!(
                "expected a JSON array, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut decoded = Decoded {
        records: Vec::with_capacity(items.len()),
        warnings: Vec::new(),
    };

    for (index, item) in items.into_iter().enumerate() {
        let entity = entity_label(&item, index);
        match serde_json::from_value::<T>(item) {
            Ok(record) => decoded.records.push(record),
            Err(e) => {
                let warning = Warning::new(
                    entity,
                    WarningKind::Undecodable {
                        reason: e.to_string(),
                    },
                );
                warning.log();
                decoded.warnings.push(warning);
            }
        }
    }

    Ok(decoded)
}

/// # Errors
/// See [`decode_list`].
pub fn decode_sessions(json: &str) -> Result<Decoded<Session>, EngineError> {
    decode_list(json)
}

/// # Errors
/// See [`decode_list`].
pub fn decode_assignments(json: &str) -> Result<Decoded<Assignment>, EngineError> {
    decode_list(json)
}

/// Reads and decodes a snapshot file.
///
/// # Errors
/// Returns `EngineError::Io` if the file cannot be read, otherwise see
/// [`decode_list`].
pub fn load_list<T: DeserializeOwned>(path: &Path) -> Result<Decoded<T>, EngineError> {
    let text = fs::read_to_string(path)?;
    decode_list(&text)
}

/// The record's id when readable, its position otherwise.
fn entity_label(item: &Value, index: usize) -> String {
    match item.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("#{index}"),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_decodes_sessions() {
        let json = r#"[
            {"id": "s1", "scheduledAt": "2024-05-01T10:00:00Z"},
            {"id": 2, "scheduledAt": "2024-05-01T11:00:00Z", "durationMinutes": 30}
        ]"#;
        let decoded = decode_sessions(json).unwrap();
        assert_eq!(decoded.records.len(), 2);
        assert!(decoded.warnings.is_empty());
        assert_eq!(decoded.records[1].id.0, "2");
    }

    #[test]
    fn test_bad_element_degrades_per_record() {
        let json = r#"[
            {"id": "ok", "dueDate": "2024-05-01T10:00:00Z", "pointsTotal": 10},
            "not an object",
            {"id": {"nested": true}, "dueDate": "2024-05-01T10:00:00Z"}
        ]"#;
        let decoded = decode_assignments(json).unwrap();
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.warnings.len(), 2);
        assert_eq!(decoded.warnings[0].entity, "#1");
        assert_eq!(decoded.warnings[1].entity, "#2");
        assert!(decoded.warnings.iter().all(Warning::is_skip));
    }

    #[test]
    fn test_null_and_numeric_fields_keep_the_record() {
        let json = r#"[
            {"id": "a1", "dueDate": null, "pointsTotal": 10},
            {"id": "a2", "dueDate": "2024-05-01T10:00:00Z", "pointsTotal": null},
            {"id": "a3", "dueDate": 1714557600000, "pointsTotal": "ten"}
        ]"#;
        let decoded = decode_assignments(json).unwrap();
        assert!(decoded.warnings.is_empty());
        assert_eq!(decoded.records.len(), 3);
        assert_eq!(decoded.records[0].due_date, "");
        assert_eq!(decoded.records[1].points_total, 0.0);
        assert_eq!(decoded.records[2].due_date, "1714557600000");
        assert_eq!(decoded.records[2].points_total, 0.0);

        let sessions = decode_sessions(r#"[{"id": "s1", "scheduledAt": null}]"#).unwrap();
        assert_eq!(sessions.records.len(), 1);
        assert_eq!(sessions.records[0].scheduled_at, "");
    }

    #[test]
    fn test_not_an_array_is_a_hard_failure() {
        let err = decode_sessions(r#"{"id": "s1"}"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
        assert_eq!(err.to_string(), "invalid input: expected a JSON array, found an object");
    }

    #[test]
    fn test_invalid_json_is_a_hard_failure() {
        let err = decode_sessions("[{").unwrap_err();
        assert!(matches!(err, EngineError::Json(_)));
    }

    #[test]
    fn test_empty_array() {
        let decoded = decode_sessions("[]").unwrap();
        assert!(decoded.records.is_empty());
    }

    #[test]
    fn test_load_list_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "a1", "dueDate": "2024-05-01T10:00:00Z"}}]"#).unwrap();

        let decoded: Decoded<Assignment> = load_list(file.path()).unwrap();
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.records[0].points_total, 0.0);
    }

    #[test]
    fn test_load_list_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_list::<Session>(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }
}
