//! Request payload parsing and validation.
//!
//! The body is either a JSON array of change items or a single item
//! object. Parsing is an explicit two-stage pipeline: try the array
//! shape first, fall back to a single object wrapped in a one-element
//! list, and fail otherwise. Item fields are dynamic JSON values that
//! collapse into [`FieldValue`], a small union over the shapes the
//! stored procedure accepts.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Maximum declared payload size in bytes.
pub const MAX_PAYLOAD_BYTES: u64 = 10_240;

/// Payload-level failures, mapped onto 400 responses by the handler.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// Body was not a JSON array of objects nor a single object, or the
    /// resulting item list was empty.
    #[error("Invalid payload.")]
    Invalid,

    /// An item is missing `internalID` and/or `changeValue`.
    #[error("Missing required params 'internalID' and/or 'changeValue'.")]
    MissingParams,
}

/// A single item field: string, number, or null.
///
/// Replaces the dynamic JSON typing of the wire format with an explicit
/// union. Values outside the union (booleans, nested structures) keep
/// their compact JSON rendering when converted to a parameter string.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// JSON string, passed through unchanged.
    Str(String),
    /// JSON number, rendered in canonical decimal form.
    Num(Number),
    /// Explicit JSON null, rendered as the empty string.
    Null,
}

impl FieldValue {
    /// Converts a raw JSON value into the field union.
    fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Str(s.clone()),
            Value::Number(n) => Self::Num(n.clone()),
            Value::Null => Self::Null,
            other => Self::Str(other.to_string()),
        }
    }

    /// Renders the value as a stored-procedure parameter string.
    pub fn to_param_string(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Num(n) => n.to_string(),
            Self::Null => String::new(),
        }
    }
}

/// One row-level unit of work extracted from the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeItem {
    /// Identifier of the row the change applies to.
    pub internal_id: FieldValue,
    /// The value to apply. All items in a request share the same value;
    /// only the first item's value is forwarded.
    pub change_value: FieldValue,
}

/// Parses the raw body into a list of item objects.
///
/// Stage one attempts a JSON array of objects; stage two attempts a
/// single object and wraps it. Anything else, or an empty resulting
/// list, is [`PayloadError::Invalid`].
pub fn parse_items(raw: &[u8]) -> Result<Vec<Map<String, Value>>, PayloadError> {
    let items = match serde_json::from_slice::<Vec<Map<String, Value>>>(raw) {
        Ok(list) => list,
        Err(_) => match serde_json::from_slice::<Map<String, Value>>(raw) {
            Ok(obj) => vec![obj],
            Err(_) => return Err(PayloadError::Invalid),
        },
    };

    if items.is_empty() {
        return Err(PayloadError::Invalid);
    }

    Ok(items)
}

/// Validates required keys and converts raw items into typed ones.
///
/// Every item must carry both `internalID` and `changeValue`; extra keys
/// are ignored. Runs before any database work.
pub fn validate_items(raw_items: &[Map<String, Value>]) -> Result<Vec<ChangeItem>, PayloadError> {
    raw_items
        .iter()
        .map(|item| {
            let internal_id = item.get("internalID").ok_or(PayloadError::MissingParams)?;
            let change_value = item.get("changeValue").ok_or(PayloadError::MissingParams)?;
            Ok(ChangeItem {
                internal_id: FieldValue::from_json(internal_id),
                change_value: FieldValue::from_json(change_value),
            })
        })
        .collect()
}

/// Joins all items' identifiers into the comma-separated list the
/// procedure takes as its `internalID` parameter.
pub fn join_internal_ids(items: &[ChangeItem]) -> String {
    items.iter().map(|item| item.internal_id.to_param_string()).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_object_parses_to_one_element_list() {
        let raw = br#"{"internalID":1,"changeValue":"x"}"#;
        let items = parse_items(raw).expect("single object parses");
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn array_of_objects_parses_to_list() {
        let raw = br#"[{"internalID":1,"changeValue":"x"},{"internalID":2,"changeValue":"x"}]"#;
        let items = parse_items(raw).expect("array parses");
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn malformed_json_is_invalid() {
        assert_eq!(parse_items(b"not json"), Err(PayloadError::Invalid));
    }

    #[test]
    fn empty_array_is_invalid() {
        assert_eq!(parse_items(b"[]"), Err(PayloadError::Invalid));
    }

    #[test]
    fn scalar_body_is_invalid() {
        assert_eq!(parse_items(b"42"), Err(PayloadError::Invalid));
        assert_eq!(parse_items(br#""text""#), Err(PayloadError::Invalid));
    }

    #[test]
    fn missing_change_value_fails_validation() {
        let raw = br#"[{"internalID":1}]"#;
        let items = parse_items(raw).unwrap();
        assert_eq!(validate_items(&items), Err(PayloadError::MissingParams));
    }

    #[test]
    fn missing_internal_id_fails_validation() {
        let raw = br#"[{"changeValue":"x"}]"#;
        let items = parse_items(raw).unwrap();
        assert_eq!(validate_items(&items), Err(PayloadError::MissingParams));
    }

    #[test]
    fn extra_keys_are_ignored() {
        let raw = br#"[{"internalID":1,"changeValue":"x","rowVersion":9}]"#;
        let items = parse_items(raw).unwrap();
        let typed = validate_items(&items).expect("extras ignored");
        assert_eq!(typed[0].internal_id.to_param_string(), "1");
    }

    #[test]
    fn numbers_render_in_canonical_decimal_form() {
        let raw = br#"[{"internalID":5,"changeValue":7.5}]"#;
        let items = parse_items(raw).unwrap();
        let typed = validate_items(&items).unwrap();
        assert_eq!(typed[0].internal_id.to_param_string(), "5");
        assert_eq!(typed[0].change_value.to_param_string(), "7.5");
    }

    #[test]
    fn null_field_is_present_and_renders_empty() {
        let raw = br#"[{"internalID":null,"changeValue":"x"}]"#;
        let items = parse_items(raw).unwrap();
        let typed = validate_items(&items).expect("null counts as present");
        assert_eq!(typed[0].internal_id, FieldValue::Null);
        assert_eq!(typed[0].internal_id.to_param_string(), "");
    }

    #[test]
    fn internal_ids_join_with_commas() {
        let raw = br#"[{"internalID":5,"changeValue":"x"},{"internalID":7,"changeValue":"x"}]"#;
        let items = validate_items(&parse_items(raw).unwrap()).unwrap();
        assert_eq!(join_internal_ids(&items), "5,7");
    }

    #[test]
    fn string_and_numeric_ids_mix_in_join() {
        let raw = br#"[{"internalID":"A-10","changeValue":"x"},{"internalID":11,"changeValue":"x"}]"#;
        let items = validate_items(&parse_items(raw).unwrap()).unwrap();
        assert_eq!(join_internal_ids(&items), "A-10,11");
    }
}
