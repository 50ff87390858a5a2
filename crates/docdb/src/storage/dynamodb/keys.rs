//! DynamoDB key layout.
//!
//! Every document lives under a partition key (`hashKey`) and a sort key (`id`).
//! All functions are sync and have no side effects.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use docdb_core::expression::FieldMap;
use serde_json::Value;

// ============================================================================
// Attribute names
// ============================================================================

pub const HASH_KEY_ATTRIBUTE: &str = "hashKey";
pub const ID_ATTRIBUTE: &str = "id";
pub const CREATED_AT_ATTRIBUTE: &str = "createdAt";

/// Condition applied to creates when the caller supplies none.
pub const DEFAULT_CREATE_CONDITION: &str = "attribute_not_exists(id)";

// ============================================================================
// Keys
// ============================================================================

/// Generate the primary key for an item.
///
/// Pattern: `{ hashKey: S(<hash_key>), id: S(<id>) }`
pub fn primary_key(hash_key: &str, id: &str) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            HASH_KEY_ATTRIBUTE.to_string(),
            AttributeValue::S(hash_key.to_string()),
        ),
        (ID_ATTRIBUTE.to_string(), AttributeValue::S(id.to_string())),
    ])
}

/// Key fields for a partition query, fed to the key condition builder.
pub fn partition_key_fields(hash_key: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert(
        HASH_KEY_ATTRIBUTE.to_string(),
        Value::String(hash_key.to_string()),
    );
    fields
}
