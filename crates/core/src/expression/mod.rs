mod attributes;
mod filter;
mod key;
mod matcher;
mod placeholder;
mod update;

pub use attributes::{build_expression_attributes, AttributeOptions};
pub use filter::{build_filter_expression, FilterExpression};
pub use key::{build_key_condition, KeyCondition};
pub use matcher::{Condition, FieldMatch, Operator};
pub use placeholder::{
    indexed_value_placeholder, name_placeholder, value_placeholder, FieldMap, PlaceholderTable,
};
pub use update::{
    build_update_expression, build_update_expression_at, timestamp, UpdateExpression,
    MODIFIED_AT_FIELD,
};
