use serde_json::{Map, Value};

/// Renders a scalar as text when it counts as "present": non-empty strings,
/// non-zero numbers and `true`. Everything else (null, empty text, zero, false,
/// arrays and objects) yields `None`.
pub fn present_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(number_text(n)),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// First present value among `keys`, in order.
pub fn first_present<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| present_text(Some(value)).is_some() || is_nonempty_collection(value))
}

/// Text of the first present value among `keys`, or an empty string.
pub fn text_or_empty(record: &Map<String, Value>, keys: &[&str]) -> String {
    present_text(first_present(record, keys)).unwrap_or_default()
}

/// Joins the textual elements of an array with `", "`; a present scalar is taken
/// as-is.
pub fn join_list(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| present_text(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        other => present_text(other).unwrap_or_default(),
    }
}

/// Text of a scalar without truthiness: empty strings, `0` and `false` are kept.
/// Null and nested values render empty.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn is_nonempty_collection(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => false,
    }
}

fn number_text(n: &serde_json::Number) -> String {
    match (n.as_i64(), n.as_f64()) {
        (Some(i), _) => i.to_string(),
        (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_and_falsy_values_are_absent() {
        assert_eq!(present_text(Some(&json!(""))), None);
        assert_eq!(present_text(Some(&json!(0))), None);
        assert_eq!(present_text(Some(&json!(false))), None);
        assert_eq!(present_text(Some(&Value::Null)), None);
        assert_eq!(present_text(None), None);
    }

    #[test]
    fn numbers_render_without_trailing_fraction() {
        assert_eq!(present_text(Some(&json!(5551234))).as_deref(), Some("5551234"));
        assert_eq!(present_text(Some(&json!(3.0))).as_deref(), Some("3"));
        assert_eq!(present_text(Some(&json!(2.5))).as_deref(), Some("2.5"));
    }

    #[test]
    fn aliases_fall_through_empty_values() {
        let record = json!({ "name": "", "Name": "Ada" });
        let record = record.as_object().unwrap();
        assert_eq!(text_or_empty(record, &["name", "Name"]), "Ada");
        assert_eq!(text_or_empty(record, &["missing"]), "");
    }

    #[test]
    fn scalar_text_keeps_falsy_values() {
        assert_eq!(scalar_text(&json!("")), "");
        assert_eq!(scalar_text(&json!(0)), "0");
        assert_eq!(scalar_text(&json!(false)), "false");
        assert_eq!(scalar_text(&Value::Null), "");
        assert_eq!(scalar_text(&json!(["x"])), "");
    }

    #[test]
    fn join_list_accepts_arrays_and_scalars() {
        assert_eq!(join_list(Some(&json!(["remote", "onsite"]))), "remote, onsite");
        assert_eq!(join_list(Some(&json!("remote"))), "remote");
        assert_eq!(join_list(Some(&json!({ "a": 1 }))), "");
        assert_eq!(join_list(None), "");
    }
}
