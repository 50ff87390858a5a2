//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between JSON documents and DynamoDB
//! `AttributeValue` maps. These are testable in isolation without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::{AttributeValue, ConsumedCapacity};
use docdb_core::expression::PlaceholderTable;
use docdb_core::storage::{Document, ItemsResponse, RepositoryError, ScanPage};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

pub type Item = HashMap<String, AttributeValue>;

// ============================================================================
// JSON -> DynamoDB
// ============================================================================

/// Convert a JSON value to an attribute value.
pub fn value_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(value_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(document_to_item(map)),
    }
}

/// Convert a JSON document to a DynamoDB item.
pub fn document_to_item(document: &Map<String, Value>) -> Item {
    document
        .iter()
        .map(|(key, value)| (key.clone(), value_to_attribute(value)))
        .collect()
}

/// Name placeholders in SDK form.
pub fn placeholder_names(table: &PlaceholderTable) -> HashMap<String, String> {
    table
        .names
        .iter()
        .map(|(placeholder, name)| (placeholder.clone(), name.clone()))
        .collect()
}

/// Value placeholders in SDK form.
pub fn placeholder_values(table: &PlaceholderTable) -> Item {
    table
        .values
        .iter()
        .map(|(placeholder, value)| (placeholder.clone(), value_to_attribute(value)))
        .collect()
}

/// Convert a pagination cursor into an exclusive start key.
///
/// The cursor is the `lastScannedId` of a previous page: a key object.
pub fn start_key_to_item(cursor: &Value) -> Result<Item, RepositoryError> {
    match cursor {
        Value::Object(map) => Ok(document_to_item(map)),
        other => Err(RepositoryError::InvalidData(format!(
            "Pagination cursor must be a key object, got {other}"
        ))),
    }
}

// ============================================================================
// DynamoDB -> JSON
// ============================================================================

/// Convert an attribute value to a JSON value.
pub fn attribute_to_value(attribute: &AttributeValue) -> Result<Value, RepositoryError> {
    match attribute {
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::N(n) => parse_number(n).map(Value::Number),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::L(items) => items
            .iter()
            .map(attribute_to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        AttributeValue::M(map) => item_to_document(map).map(Value::Object),
        AttributeValue::Ss(strings) => Ok(Value::Array(
            strings.iter().cloned().map(Value::String).collect(),
        )),
        AttributeValue::Ns(numbers) => numbers
            .iter()
            .map(|n| parse_number(n).map(Value::Number))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        AttributeValue::B(_) | AttributeValue::Bs(_) => Err(RepositoryError::InvalidData(
            "Binary attributes are not supported".to_string(),
        )),
        other => Err(RepositoryError::InvalidData(format!(
            "Unknown attribute type: {other:?}"
        ))),
    }
}

/// Convert a DynamoDB item to a JSON document.
pub fn item_to_document(item: &Item) -> Result<Document, RepositoryError> {
    item.iter()
        .map(|(key, attribute)| attribute_to_value(attribute).map(|value| (key.clone(), value)))
        .collect()
}

/// Deserialize a JSON document into `T`.
pub fn document_to_typed<T: DeserializeOwned>(document: Document) -> Result<T, RepositoryError> {
    serde_json::from_value(Value::Object(document))
        .map_err(|e| RepositoryError::Serialization(e.to_string()))
}

/// Convert a DynamoDB item into `T`.
pub fn item_to_typed<T: DeserializeOwned>(item: &Item) -> Result<T, RepositoryError> {
    document_to_typed(item_to_document(item)?)
}

// ============================================================================
// Responses
// ============================================================================

/// Capacity units from an optional consumed-capacity block, `0.0` when absent.
pub fn capacity_units(consumed: Option<&ConsumedCapacity>) -> f64 {
    consumed
        .and_then(ConsumedCapacity::capacity_units)
        .unwrap_or(0.0)
}

/// Build a page from the raw parts of a Scan or Query output.
pub fn scan_page(
    items: Option<Vec<Item>>,
    count: i32,
    consumed: Option<&ConsumedCapacity>,
    last_evaluated_key: Option<&Item>,
) -> Result<ScanPage, RepositoryError> {
    let items = items
        .unwrap_or_default()
        .iter()
        .map(item_to_document)
        .collect::<Result<Vec<_>, _>>()?;
    let last_evaluated_key = last_evaluated_key
        .map(|key| item_to_document(key).map(Value::Object))
        .transpose()?;

    Ok(ScanPage {
        items,
        count: usize::try_from(count).unwrap_or_default(),
        consumed_capacity: consumed.and_then(ConsumedCapacity::capacity_units),
        last_evaluated_key,
    })
}

/// Deserialize every item of a page into `T`.
pub fn page_to_response<T: DeserializeOwned>(page: ScanPage) -> Result<ItemsResponse<T>, RepositoryError> {
    let items = page
        .items
        .into_iter()
        .map(document_to_typed)
        .collect::<Result<Vec<T>, _>>()?;

    Ok(ItemsResponse {
        items,
        count: page.count,
        consumed_capacity: page.consumed_capacity.unwrap_or(0.0),
        last_scanned_id: page.last_evaluated_key,
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_number(raw: &str) -> Result<Number, RepositoryError> {
    serde_json::from_str::<Number>(raw)
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid number {raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::primitives::Blob;
    use serde::Deserialize;
    use serde_json::json;

    fn document(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(value_to_attribute(&json!(null)), AttributeValue::Null(true));
        assert_eq!(value_to_attribute(&json!(true)), AttributeValue::Bool(true));
        assert_eq!(value_to_attribute(&json!(42)), AttributeValue::N("42".to_string()));
        assert_eq!(
            value_to_attribute(&json!(1.5)),
            AttributeValue::N("1.5".to_string())
        );
        assert_eq!(
            value_to_attribute(&json!("thyme")),
            AttributeValue::S("thyme".to_string())
        );
    }

    #[test]
    fn test_nested_document_round_trip() {
        let original = document(json!({
            "id": "abc",
            "count": 3,
            "ratio": 0.25,
            "tags": ["a", "b"],
            "meta": { "deleted": false, "parent": null },
        }));

        let item = document_to_item(&original);
        let parsed = item_to_document(&item).unwrap();

        assert_eq!(parsed, original);
    }

    #[test]
    fn test_nested_item_shapes() {
        let item = document_to_item(&document(json!({ "tags": ["a"], "meta": { "n": 1 } })));

        assert_eq!(
            item.get("tags"),
            Some(&AttributeValue::L(vec![AttributeValue::S("a".to_string())]))
        );
        assert!(item.get("meta").unwrap().as_m().is_ok());
    }

    #[test]
    fn test_sets_become_arrays() {
        let strings = AttributeValue::Ss(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(attribute_to_value(&strings).unwrap(), json!(["a", "b"]));

        let numbers = AttributeValue::Ns(vec!["1".to_string(), "2.5".to_string()]);
        assert_eq!(attribute_to_value(&numbers).unwrap(), json!([1, 2.5]));
    }

    #[test]
    fn test_binary_is_rejected() {
        let blob = AttributeValue::B(Blob::new(vec![1, 2, 3]));
        assert!(matches!(
            attribute_to_value(&blob),
            Err(RepositoryError::InvalidData(_))
        ));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let bad = AttributeValue::N("not-a-number".to_string());
        assert!(matches!(
            attribute_to_value(&bad),
            Err(RepositoryError::InvalidData(_))
        ));
    }

    #[test]
    fn test_placeholder_tables_convert() {
        let table = PlaceholderTable::new()
            .with_name("type")
            .with_value("type", "spice");

        let names = placeholder_names(&table);
        let values = placeholder_values(&table);

        assert_eq!(names.get("#type"), Some(&"type".to_string()));
        assert_eq!(
            values.get(":type"),
            Some(&AttributeValue::S("spice".to_string()))
        );
    }

    #[test]
    fn test_start_key_must_be_an_object() {
        let key = start_key_to_item(&json!({ "hashKey": "t", "id": "abc" })).unwrap();
        assert_eq!(key.len(), 2);

        assert!(matches!(
            start_key_to_item(&json!("abc")),
            Err(RepositoryError::InvalidData(_))
        ));
    }

    #[test]
    fn test_scan_page_from_output_parts() {
        let items = vec![document_to_item(&document(json!({ "id": "a" })))];
        let last_key = document_to_item(&document(json!({ "hashKey": "t", "id": "a" })));
        let consumed = ConsumedCapacity::builder().capacity_units(0.5).build();

        let page = scan_page(Some(items), 1, Some(&consumed), Some(&last_key)).unwrap();

        assert_eq!(page.count, 1);
        assert_eq!(page.items[0]["id"], json!("a"));
        assert_eq!(page.consumed_capacity, Some(0.5));
        assert_eq!(
            page.last_evaluated_key,
            Some(json!({ "hashKey": "t", "id": "a" }))
        );
    }

    #[test]
    fn test_page_to_typed_response() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Spice {
            id: String,
            name: String,
        }

        let page = ScanPage {
            items: vec![document(json!({ "id": "1", "name": "thyme", "hashKey": "t" }))],
            count: 1,
            consumed_capacity: None,
            last_evaluated_key: None,
        };

        let response: ItemsResponse<Spice> = page_to_response(page).unwrap();

        assert_eq!(
            response.items,
            vec![Spice {
                id: "1".to_string(),
                name: "thyme".to_string(),
            }]
        );
        assert_eq!(response.count, 1);
        assert_eq!(response.consumed_capacity, 0.0);
    }

    #[test]
    fn test_missing_capacity_defaults_to_zero() {
        assert_eq!(capacity_units(None), 0.0);
        assert_eq!(
            capacity_units(Some(&ConsumedCapacity::builder().build())),
            0.0
        );
        assert_eq!(
            capacity_units(Some(&ConsumedCapacity::builder().capacity_units(2.5).build())),
            2.5
        );
    }

    #[test]
    fn test_typed_conversion_reports_serialization_errors() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Strict {
            required: String,
        }

        let item = document_to_item(&document(json!({ "other": 1 })));
        assert!(matches!(
            item_to_typed::<Strict>(&item),
            Err(RepositoryError::Serialization(_))
        ));
    }
}
