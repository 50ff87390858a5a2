use thiserror::Error;

/// Errors raised while validating or planning a query.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error(
        "Unsupported query shape: fields {} each hold more than {chunk_size} values; \
         only one oversized IN list can be chunked",
        .fields.join(", ")
    )]
    UnsupportedQueryShape {
        fields: Vec<String>,
        chunk_size: usize,
    },
    #[error("Invalid control field {field}: {reason}")]
    InvalidControlField { field: String, reason: String },
}

/// Result type for query planning.
pub type Result<T> = std::result::Result<T, QueryError>;
