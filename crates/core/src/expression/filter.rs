use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::query::QueryDescriptor;

use super::attributes::{build_expression_attributes, AttributeOptions};
use super::placeholder::{FieldMap, PlaceholderTable};

/// A conjunctive filter expression plus the scan directives split off the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterExpression {
    #[serde(rename = "FilterExpression")]
    pub filter_expression: String,
    #[serde(flatten)]
    pub attributes: PlaceholderTable,
    #[serde(rename = "Limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(rename = "ScanIndexForward")]
    pub scan_index_forward: bool,
    #[serde(rename = "ExclusiveStartKey", skip_serializing_if = "Option::is_none")]
    pub exclusive_start_key: Option<Value>,
}

/// Builds the filter expression for a query descriptor.
///
/// `expression_prefix` is complete leading clause text (without a trailing
/// `and`); field clauses are appended to it with `" and "`.
pub fn build_filter_expression(query: &QueryDescriptor, expression_prefix: &str) -> FilterExpression {
    let mut flattened = FieldMap::new();
    let mut unused_value_keys = BTreeSet::new();
    let mut clauses = Vec::with_capacity(query.len());

    for (field, matcher) in query.fields() {
        if matcher.is_existence_check() {
            unused_value_keys.insert(field.to_string());
        }
        clauses.push(matcher.clause(field));
        flattened.insert(field.to_string(), matcher.operand());
    }

    let attributes = build_expression_attributes(
        &flattened,
        AttributeOptions {
            unused_value_keys,
            expand_arrays: true,
            ..AttributeOptions::default()
        },
    );

    FilterExpression {
        filter_expression: join_clauses(expression_prefix, &clauses),
        attributes,
        limit: query.limit.filter(|limit| *limit > 0),
        scan_index_forward: query.is_ascending.unwrap_or(true),
        exclusive_start_key: query.start_key.clone(),
    }
}

fn join_clauses(prefix: &str, clauses: &[String]) -> String {
    let joined = clauses.join(" and ");
    match (prefix.is_empty(), joined.is_empty()) {
        (true, _) => joined,
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix} and {joined}"),
    }
}
