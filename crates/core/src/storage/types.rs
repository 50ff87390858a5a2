use serde::Serialize;
use serde_json::{Map, Value};

/// A stored document in JSON form.
pub type Document = Map<String, Value>;

/// Addressing and write options shared by the single-item operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Partition key value of the item.
    pub hash_key: String,
    /// Condition expression applied to writes, replacing the default.
    pub condition_expression: Option<String>,
}

impl ContextOptions {
    pub fn new(hash_key: impl Into<String>) -> Self {
        Self {
            hash_key: hash_key.into(),
            condition_expression: None,
        }
    }

    pub fn with_condition(mut self, condition_expression: impl Into<String>) -> Self {
        self.condition_expression = Some(condition_expression.into());
        self
    }
}

/// A single item with the capacity consumed to read or write it.
///
/// Capacity is `0.0` when the store reports none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse<T> {
    pub item: T,
    pub consumed_capacity: f64,
}

/// A page of items with capacity and pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
    pub count: usize,
    pub consumed_capacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_scanned_id: Option<Value>,
}

/// One page of raw scan or query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPage {
    pub items: Vec<Document>,
    pub count: usize,
    pub consumed_capacity: Option<f64>,
    pub last_evaluated_key: Option<Value>,
}

impl ScanPage {
    /// Concatenates pages in order.
    ///
    /// Capacity is summed (missing counts as zero), the continuation key is
    /// the last page's, and `count` is the number of merged items.
    pub fn merge(pages: Vec<ScanPage>) -> ScanPage {
        let consumed_capacity: f64 = pages
            .iter()
            .map(|page| page.consumed_capacity.unwrap_or(0.0))
            .sum();
        let last_evaluated_key = pages.last().and_then(|page| page.last_evaluated_key.clone());
        let items: Vec<Document> = pages.into_iter().flat_map(|page| page.items).collect();

        ScanPage {
            count: items.len(),
            items,
            consumed_capacity: Some(consumed_capacity),
            last_evaluated_key,
        }
    }
}
