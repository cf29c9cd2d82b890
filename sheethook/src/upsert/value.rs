//! Cell value representation shared by the store and the upsert engine

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A scalar value held in a spreadsheet cell or carried by an upsert record.
///
/// An empty cell is `Text("")`. Incoming JSON strings always land as `Text`,
/// even when they look like timestamps: comparison mode is chosen by the
/// stored side (see [`value_equals`]), so eager date sniffing here would
/// change match semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Text value; the empty string doubles as the empty cell
    Text(String),
    /// Numeric value (integers and decimals alike)
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// A point in time, normalized to UTC
    DateTime(DateTime<Utc>),
}

impl CellValue {
    /// The empty cell
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    /// Check if this is an empty cell
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }

    /// Convert a JSON scalar into a cell value
    ///
    /// `null` becomes the empty cell. Arrays and objects are not supported
    /// as cell contents and are flattened to their JSON text.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => CellValue::empty(),
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => {
                CellValue::Number(n.as_f64().unwrap_or(f64::NAN))
            }
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                CellValue::Text(json.to_string())
            }
        }
    }

    /// Convert to a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
            CellValue::Number(n) => serde_json::json!(*n),
            CellValue::Bool(b) => serde_json::Value::Bool(*b),
            CellValue::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
        }
    }

    /// Numeric view used by loose comparison. Booleans coerce to 1/0,
    /// text parses if it is a plain number, instants do not coerce.
    fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::DateTime(_) => None,
        }
    }

    /// Interpret this value as an instant, if possible.
    ///
    /// Text accepts RFC 3339 plus the date/datetime shapes spreadsheets
    /// commonly hold; numbers are read as epoch milliseconds.
    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Text(s) => parse_instant(s.trim()),
            CellValue::Number(n) => {
                if n.fract() == 0.0 {
                    DateTime::<Utc>::from_timestamp_millis(*n as i64)
                } else {
                    None
                }
            }
            CellValue::Bool(_) => None,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::empty()
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Ok(CellValue::from_json(&json))
    }
}

/// Parse a textual timestamp into a UTC instant
fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Loose scalar equality: numeric when both sides coerce to a number
/// (so `"1"` equals `1`), textual otherwise.
pub fn loose_eq(lhs: &CellValue, rhs: &CellValue) -> bool {
    if let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number()) {
        return a == b;
    }
    lhs.to_string() == rhs.to_string()
}

/// Compare a stored cell against an incoming value.
///
/// Only the stored side selects the comparison mode: a stored instant
/// matches any incoming representation of the same point in time, while
/// everything else falls back to [`loose_eq`].
pub fn value_equals(stored: &CellValue, incoming: &CellValue) -> bool {
    match stored {
        CellValue::DateTime(instant) => incoming
            .as_instant()
            .map(|i| i == *instant)
            .unwrap_or(false),
        _ => loose_eq(stored, incoming),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(CellValue::from_json(&serde_json::json!(null)), CellValue::empty());
        assert_eq!(CellValue::from_json(&serde_json::json!(true)), CellValue::Bool(true));
        assert_eq!(CellValue::from_json(&serde_json::json!(42)), CellValue::Number(42.0));
        assert_eq!(CellValue::from_json(&serde_json::json!("hi")), text("hi"));
        // Timestamp-looking strings stay text until compared
        assert_eq!(
            CellValue::from_json(&serde_json::json!("2024-03-01T12:00:00Z")),
            text("2024-03-01T12:00:00Z")
        );
    }

    #[test]
    fn test_loose_eq_coercion() {
        assert!(loose_eq(&text("1"), &CellValue::Number(1.0)));
        assert!(loose_eq(&CellValue::Number(1.0), &text("1")));
        assert!(loose_eq(&CellValue::Bool(true), &CellValue::Number(1.0)));
        assert!(loose_eq(&text("alice"), &text("alice")));
        assert!(!loose_eq(&text("alice"), &text("bob")));
        assert!(!loose_eq(&text("2"), &CellValue::Number(1.0)));
    }

    #[test]
    fn test_value_equals_stored_instant_matches_any_representation() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let stored = CellValue::DateTime(instant);

        assert!(value_equals(&stored, &text("2024-03-01T12:00:00Z")));
        assert!(value_equals(&stored, &text("2024-03-01T12:00:00+00:00")));
        assert!(value_equals(&stored, &text("2024-03-01 12:00:00")));
        assert!(value_equals(&stored, &text("2024-03-01T14:00:00+02:00")));
        assert!(value_equals(&stored, &CellValue::DateTime(instant)));
        // Epoch milliseconds
        assert!(value_equals(
            &stored,
            &CellValue::Number(instant.timestamp_millis() as f64)
        ));
    }

    #[test]
    fn test_value_equals_stored_instant_rejects_other_instants() {
        let stored =
            CellValue::DateTime(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        assert!(!value_equals(&stored, &text("2024-03-01T12:00:01Z")));
        assert!(!value_equals(&stored, &text("not a date")));
        assert!(!value_equals(&stored, &CellValue::Bool(true)));
    }

    #[test]
    fn test_value_equals_stored_text_is_loose() {
        // A stored date-looking string does not get instant semantics
        assert!(value_equals(&text("10"), &CellValue::Number(10.0)));
        assert!(!value_equals(
            &text("2024-03-01T12:00:00Z"),
            &text("2024-03-01 12:00:00")
        ));
    }

    #[test]
    fn test_date_only_text_parses_to_midnight() {
        let stored =
            CellValue::DateTime(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert!(value_equals(&stored, &text("2024-03-01")));
    }

    #[test]
    fn test_empty_cell() {
        assert!(CellValue::empty().is_empty());
        assert!(!text("x").is_empty());
        assert!(value_equals(&CellValue::empty(), &text("")));
    }

    #[test]
    fn test_serde_roundtrip() {
        let record: std::collections::BTreeMap<String, CellValue> =
            serde_json::from_str(r#"{"a": "1", "b": 2, "c": true, "d": null}"#).unwrap();
        assert_eq!(record["a"], text("1"));
        assert_eq!(record["b"], CellValue::Number(2.0));
        assert_eq!(record["c"], CellValue::Bool(true));
        assert_eq!(record["d"], CellValue::empty());
    }
}
