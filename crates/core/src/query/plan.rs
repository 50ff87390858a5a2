use crate::expression::FieldMatch;

use super::descriptor::QueryDescriptor;
use super::error::{QueryError, Result};

/// Maximum number of values in a single `IN` list.
pub const CHUNK_SIZE: usize = 100;

/// How a query is split into scans.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    /// Every IN list fits; one scan.
    Single(QueryDescriptor),
    /// One IN list is oversized; one scan per chunk of it.
    Chunked {
        field: String,
        chunks: Vec<QueryDescriptor>,
    },
}

impl QueryPlan {
    /// The descriptors to scan, in chunk order.
    pub fn into_descriptors(self) -> Vec<QueryDescriptor> {
        match self {
            QueryPlan::Single(query) => vec![query],
            QueryPlan::Chunked { chunks, .. } => chunks,
        }
    }
}

/// Plans `query` against [`CHUNK_SIZE`].
pub fn plan_query(query: &QueryDescriptor) -> Result<QueryPlan> {
    plan_query_with_chunk_size(query, CHUNK_SIZE)
}

/// Plans `query`, chunking any IN list longer than `chunk_size`.
///
/// At most one field may be oversized: chunking two lists would need the
/// cross product of their chunks.
pub fn plan_query_with_chunk_size(query: &QueryDescriptor, chunk_size: usize) -> Result<QueryPlan> {
    let chunk_size = chunk_size.max(1);

    let oversized: Vec<(&str, &Vec<serde_json::Value>)> = query
        .fields()
        .filter_map(|(field, matcher)| match matcher {
            FieldMatch::In(values) if values.len() > chunk_size => Some((field, values)),
            _ => None,
        })
        .collect();

    match oversized.as_slice() {
        [] => Ok(QueryPlan::Single(query.clone())),
        [(field, values)] => {
            let chunks = values
                .chunks(chunk_size)
                .map(|chunk| query.clone().with_field(*field, FieldMatch::In(chunk.to_vec())))
                .collect();
            Ok(QueryPlan::Chunked {
                field: field.to_string(),
                chunks,
            })
        }
        _ => Err(QueryError::UnsupportedQueryShape {
            fields: oversized
                .iter()
                .map(|(field, _)| field.to_string())
                .collect(),
            chunk_size,
        }),
    }
}
