// Wire types for the transaction store.
//
// The store is schemaless from our point of view: rows come back with
// fields missing, null, or of the wrong JSON type. Every field therefore
// decodes through a lenient helper that maps anything unusable to `None`
// instead of failing the whole response.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Identifiers ─────────────────────────────────────────────────────

/// Store-assigned record identifier.
///
/// The store may hand out integers or strings; both round-trip unchanged.
/// Equality goes by the textual form, so `7` and `"7"` name the same record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl PartialEq for RecordId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl Eq for RecordId {}

impl std::hash::Hash for RecordId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        s.parse::<i64>()
            .map_or_else(|_| Self::Text(s.to_owned()), Self::Number)
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

// ── Session record ──────────────────────────────────────────────────

/// A parking session as stored remotely.
///
/// Serialization skips absent fields, so a record fetched and sent back
/// unmodified produces the same JSON keys the store gave us.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub owner_name: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub vehicle_name: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub vehicle_type: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub plate_number: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub parking_slot: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub entry_time: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub exit_time: Option<String>,
}

impl SessionRecord {
    /// Decode one element of a listing, tolerating non-object rows.
    ///
    /// Returns `None` for anything that isn't a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }
}

/// Body for `POST /transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSessionRecord {
    pub owner_name: String,
    pub vehicle_name: String,
    pub vehicle_type: String,
    pub plate_number: String,
    pub entry_time: String,
    pub parking_slot: String,
}

// ── Lenient decoders ────────────────────────────────────────────────

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(RecordId::Number)
            .or_else(|| Some(RecordId::Text(n.to_string()))),
        Some(Value::String(s)) if !s.is_empty() => Some(RecordId::Text(s)),
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn numeric_and_text_ids_match_by_text() {
        assert_eq!(RecordId::Number(7), RecordId::Text("7".into()));
        assert_eq!(RecordId::from("7"), RecordId::Number(7));
        assert_ne!(RecordId::Number(7), RecordId::Text("07".into()));
    }

    #[test]
    fn decodes_complete_record() {
        let rec: SessionRecord = serde_json::from_value(json!({
            "id": 7,
            "owner_name": "Jane Doe",
            "vehicle_name": "Civic",
            "vehicle_type": "car",
            "plate_number": "ABC123",
            "parking_slot": "A1",
            "entry_time": "2024-01-01T08:00",
            "exit_time": null
        }))
        .unwrap();

        assert_eq!(rec.id, Some(RecordId::Number(7)));
        assert_eq!(rec.owner_name.as_deref(), Some("Jane Doe"));
        assert_eq!(rec.exit_time, None);
    }

    #[test]
    fn wrong_field_types_become_none() {
        let rec: SessionRecord = serde_json::from_value(json!({
            "id": "abc",
            "owner_name": ["not", "a", "string"],
            "vehicle_name": { "nested": true },
            "plate_number": 123_456,
            "extra": "ignored"
        }))
        .unwrap();

        assert_eq!(rec.id, Some(RecordId::Text("abc".into())));
        assert_eq!(rec.owner_name, None);
        assert_eq!(rec.vehicle_name, None);
        assert_eq!(rec.plate_number.as_deref(), Some("123456"));
    }

    #[test]
    fn non_object_row_is_skipped() {
        assert!(SessionRecord::from_value(json!("garbage")).is_none());
        assert!(SessionRecord::from_value(json!(42)).is_none());
        assert!(SessionRecord::from_value(json!({})).is_some());
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let rec = SessionRecord {
            id: Some(RecordId::Number(1)),
            exit_time: Some("2024-01-01T10:30".into()),
            ..SessionRecord::default()
        };
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value, json!({ "id": 1, "exit_time": "2024-01-01T10:30" }));
    }

    #[test]
    fn record_id_from_str_prefers_numbers() {
        assert_eq!(RecordId::from("42"), RecordId::Number(42));
        assert_eq!(RecordId::from("a-42"), RecordId::Text("a-42".into()));
        assert_eq!(RecordId::from("42").to_string(), "42");
    }
}
