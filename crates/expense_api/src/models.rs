use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The whole persisted state: `{ "expenses": [...] }`, newest expense first.
///
/// Top-level keys other than `expenses` are kept and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single expense record.
///
/// Only `id` and `date` are owned by the server; every other field is
/// whatever the client sent, kept in the order it arrived. Entries that are
/// not JSON objects (a stray `null` in a hand-edited file) are carried
/// through untouched and never match an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Expense(Value);

impl Expense {
    /// Builds a new expense from client fields, then stamps `id` and `date`
    /// from `now`. The stamped values replace any client-supplied ones.
    pub fn stamped(fields: Map<String, Value>, now: DateTime<Utc>) -> Self {
        let mut record = Map::with_capacity(fields.len() + 2);
        // Reserve the first slot so `id` leads the serialized object.
        record.insert("id".to_string(), Value::Null);
        record.extend(fields);
        record.insert("id".to_string(), Value::from(now.timestamp_millis()));
        record.insert(
            "date".to_string(),
            Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        Self(Value::Object(record))
    }

    pub fn id(&self) -> Option<&Value> {
        self.get("id")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.as_object().and_then(|fields| fields.get(key))
    }

    pub fn has_id(&self, id: i64) -> bool {
        self.id().is_some_and(|value| id_equals(value, id))
    }

    /// Shallow merge: incoming fields overwrite same-named fields. A
    /// non-object entry is left as it is.
    pub fn merge(&mut self, fields: Map<String, Value>) {
        if let Value::Object(record) = &mut self.0 {
            record.extend(fields);
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }
}

impl Default for Expense {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl From<Map<String, Value>> for Expense {
    fn from(fields: Map<String, Value>) -> Self {
        Self(Value::Object(fields))
    }
}

/// Numeric comparison, so `1700000000000.0` in a hand-edited file still
/// matches `1700000000000`.
pub fn id_equals(value: &Value, id: i64) -> bool {
    match value {
        Value::Number(n) => {
            n.as_i64() == Some(id) || (n.is_f64() && n.as_f64() == Some(id as f64))
        }
        _ => false,
    }
}

/// Parses an `:id` path segment leniently: surrounding whitespace and a sign
/// are allowed, and parsing stops at the first non-digit (`"42abc"` is 42).
/// Returns `None` when there are no leading digits.
pub fn parse_expense_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (negative, rest) = match trimmed.as_bytes().first().copied() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_stamped_server_fields_win() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let expense = Expense::stamped(
            fields(json!({ "id": 1, "amount": 12.5, "date": "yesterday", "category": "food" })),
            now,
        );

        assert_eq!(expense.get("id"), Some(&json!(now.timestamp_millis())));
        assert_eq!(expense.get("date"), Some(&json!("2024-03-09T14:05:07.000Z")));
        assert_eq!(expense.get("amount"), Some(&json!(12.5)));
        assert_eq!(expense.get("category"), Some(&json!("food")));
    }

    #[test]
    fn test_stamped_keeps_id_first() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let expense = Expense::stamped(fields(json!({ "amount": 3, "note": "bus" })), now);

        let keys: Vec<&str> = expense
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["id", "amount", "note", "date"]);
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut expense = Expense::from(fields(json!({
            "id": 7,
            "amount": 10,
            "category": "a",
            "tags": { "work": true }
        })));
        expense.merge(fields(json!({ "amount": 20, "tags": { "home": true } })));

        assert_eq!(
            serde_json::to_value(&expense).unwrap(),
            json!({ "id": 7, "amount": 20, "category": "a", "tags": { "home": true } })
        );
    }

    #[test]
    fn test_has_id_compares_numerically() {
        let int_id = Expense::from(fields(json!({ "id": 1700000000000_i64 })));
        let float_id = Expense::from(fields(json!({ "id": 1700000000000.0 })));
        let string_id = Expense::from(fields(json!({ "id": "1700000000000" })));
        let no_id = Expense::from(fields(json!({ "amount": 1 })));

        assert!(int_id.has_id(1700000000000));
        assert!(float_id.has_id(1700000000000));
        assert!(!string_id.has_id(1700000000000));
        assert!(!no_id.has_id(1700000000000));
    }

    #[test]
    fn test_parse_expense_id() {
        assert_eq!(parse_expense_id("1700000000000"), Some(1700000000000));
        assert_eq!(parse_expense_id(" 42 "), Some(42));
        assert_eq!(parse_expense_id("42abc"), Some(42));
        assert_eq!(parse_expense_id("-5"), Some(-5));
        assert_eq!(parse_expense_id("+5"), Some(5));
        assert_eq!(parse_expense_id("abc"), None);
        assert_eq!(parse_expense_id(""), None);
        assert_eq!(parse_expense_id("-"), None);
        assert_eq!(parse_expense_id("99999999999999999999999"), None);
    }

    #[test]
    fn test_document_defaults_missing_expenses() {
        let document: Document = serde_json::from_value(json!({ "owner": "me" })).unwrap();
        assert!(document.expenses.is_empty());
        assert_eq!(document.extra.get("owner"), Some(&json!("me")));
    }

    #[test]
    fn test_document_keeps_non_object_entries() {
        let raw = json!({ "expenses": [{ "id": 1, "amount": 5 }, null, 3] });
        let mut document: Document = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(document.expenses.len(), 3);
        assert!(document.expenses[0].has_id(1));
        assert!(!document.expenses[1].has_id(1));

        document.expenses[1].merge(fields(json!({ "amount": 9 })));
        assert_eq!(serde_json::to_value(&document).unwrap(), raw);
    }

    #[test]
    fn test_document_rejects_non_array_expenses() {
        let parsed = serde_json::from_value::<Document>(json!({ "expenses": "none" }));
        assert!(parsed.is_err());
    }
}
