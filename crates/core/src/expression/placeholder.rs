use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Insertion-ordered mapping of field name to document value.
pub type FieldMap = Map<String, Value>;

/// Parallel name and value placeholder tables for a DynamoDB expression.
///
/// Serializes with DynamoDB's request parameter names so it can be merged
/// straight into a request body. Both tables iterate in insertion order, which
/// is the order placeholders appear in the built expression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderTable {
    /// `#<field>` -> field name.
    #[serde(rename = "ExpressionAttributeNames")]
    pub names: IndexMap<String, String>,
    /// `:<field>` or `:<field><index>` -> value.
    #[serde(rename = "ExpressionAttributeValues")]
    pub values: IndexMap<String, Value>,
}

impl PlaceholderTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a name placeholder for `field`.
    pub fn with_name(mut self, field: &str) -> Self {
        self.names.insert(name_placeholder(field), field.to_string());
        self
    }

    /// Adds a value placeholder for `field`.
    pub fn with_value(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.values.insert(value_placeholder(field), value.into());
        self
    }

    /// Returns true when neither table has entries.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.values.is_empty()
    }
}

/// Name placeholder for a field: `#<field>`.
pub fn name_placeholder(field: &str) -> String {
    format!("#{field}")
}

/// Value placeholder for a field: `:<field>`.
pub fn value_placeholder(field: &str) -> String {
    format!(":{field}")
}

/// Value placeholder for one element of an expanded array: `:<field><index>`.
pub fn indexed_value_placeholder(field: &str, index: usize) -> String {
    format!(":{field}{index}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placeholder_formats() {
        assert_eq!(name_placeholder("type"), "#type");
        assert_eq!(value_placeholder("type"), ":type");
        assert_eq!(indexed_value_placeholder("genres", 2), ":genres2");
    }

    #[test]
    fn test_serializes_with_dynamodb_parameter_names() {
        let table = PlaceholderTable::new()
            .with_name("createdAt")
            .with_value("createdAt", "2020-02-01T01:01:01.000Z");

        assert_eq!(
            serde_json::to_value(&table).unwrap(),
            json!({
                "ExpressionAttributeNames": { "#createdAt": "createdAt" },
                "ExpressionAttributeValues": { ":createdAt": "2020-02-01T01:01:01.000Z" },
            })
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(PlaceholderTable::new().is_empty());
        assert!(!PlaceholderTable::new().with_name("a").is_empty());
    }
}
