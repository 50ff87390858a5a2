use serde::Serialize;

use super::attributes::{build_expression_attributes, AttributeOptions};
use super::matcher::equality_clause;
use super::placeholder::{FieldMap, PlaceholderTable};

/// An equality key condition with its placeholder tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyCondition {
    #[serde(rename = "KeyConditionExpression")]
    pub key_condition_expression: String,
    #[serde(flatten)]
    pub attributes: PlaceholderTable,
}

/// Builds `#k1 = :k1 and #k2 = :k2` over the key fields, in order.
pub fn build_key_condition(keys: &FieldMap) -> KeyCondition {
    let key_condition_expression = keys
        .keys()
        .map(|field| equality_clause(field))
        .collect::<Vec<_>>()
        .join(" and ");

    KeyCondition {
        key_condition_expression,
        attributes: build_expression_attributes(keys, AttributeOptions::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_partition_key_condition() {
        let mut keys = FieldMap::new();
        keys.insert("hashKey".to_string(), json!("tenant-1"));

        let result = build_key_condition(&keys);

        assert_eq!(result.key_condition_expression, "#hashKey = :hashKey");
        assert_eq!(result.attributes.names["#hashKey"], "hashKey");
        assert_eq!(result.attributes.values[":hashKey"], json!("tenant-1"));
    }

    #[test]
    fn test_composite_key_condition() {
        let mut keys = FieldMap::new();
        keys.insert("hashKey".to_string(), json!("tenant-1"));
        keys.insert("id".to_string(), json!("abc"));

        let result = build_key_condition(&keys);

        assert_eq!(
            result.key_condition_expression,
            "#hashKey = :hashKey and #id = :id"
        );
        assert_eq!(result.attributes.values.len(), 2);
    }

    #[test]
    fn test_array_key_values_stay_whole() {
        let mut keys = FieldMap::new();
        keys.insert("hashKey".to_string(), json!(["a", "b"]));

        let result = build_key_condition(&keys);

        assert_eq!(result.attributes.values[":hashKey"], Value::from(vec!["a", "b"]));
    }
}
