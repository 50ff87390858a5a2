use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use super::attributes::{build_expression_attributes, AttributeOptions};
use super::matcher::equality_clause;
use super::placeholder::{FieldMap, PlaceholderTable};

/// Field stamped with the modification time on every update.
pub const MODIFIED_AT_FIELD: &str = "modifiedAt";

/// A `SET` update expression with its placeholder tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateExpression {
    #[serde(rename = "UpdateExpression")]
    pub update_expression: String,
    #[serde(flatten)]
    pub attributes: PlaceholderTable,
}

/// Builds the update expression for `fields`, stamped with the current time.
pub fn build_update_expression(fields: &FieldMap) -> UpdateExpression {
    build_update_expression_at(fields, Utc::now())
}

/// Builds the update expression for `fields`, stamped with `now`.
///
/// The timestamp is inserted last, so a caller-supplied `modifiedAt` keeps its
/// position but takes the stamped value.
pub fn build_update_expression_at(fields: &FieldMap, now: DateTime<Utc>) -> UpdateExpression {
    let mut stamped = fields.clone();
    stamped.insert(MODIFIED_AT_FIELD.to_string(), Value::String(timestamp(now)));

    let assignments = stamped
        .keys()
        .map(|field| equality_clause(field))
        .collect::<Vec<_>>()
        .join(", ");

    UpdateExpression {
        update_expression: format!("SET {assignments}"),
        attributes: build_expression_attributes(&stamped, AttributeOptions::default()),
    }
}

/// ISO-8601 UTC timestamp with millisecond precision, e.g. `2020-02-01T01:01:01.000Z`.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
