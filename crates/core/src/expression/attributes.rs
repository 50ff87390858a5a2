use std::collections::BTreeSet;

use serde_json::Value;

use super::placeholder::{
    indexed_value_placeholder, name_placeholder, value_placeholder, FieldMap, PlaceholderTable,
};

/// Options for [`build_expression_attributes`].
#[derive(Debug, Clone, Default)]
pub struct AttributeOptions {
    /// Fields that get a name placeholder but no value placeholder.
    pub unused_value_keys: BTreeSet<String>,
    /// Table to fold the new placeholders into.
    pub starting_table: PlaceholderTable,
    /// Expand array values into `:<field>0 .. :<field>N-1` instead of a single `:<field>`.
    pub expand_arrays: bool,
}

impl AttributeOptions {
    /// Options that expand arrays into indexed value placeholders.
    pub fn expanding() -> Self {
        Self {
            expand_arrays: true,
            ..Self::default()
        }
    }

    /// Suppresses the value placeholder for `field`.
    pub fn without_value(mut self, field: impl Into<String>) -> Self {
        self.unused_value_keys.insert(field.into());
        self
    }

    /// Folds the built placeholders into `table`.
    pub fn starting_from(mut self, table: PlaceholderTable) -> Self {
        self.starting_table = table;
        self
    }
}

/// Builds the placeholder tables for every field in `fields`, in iteration order.
///
/// Field names are assumed unique; a repeated placeholder is overwritten by the
/// later field.
pub fn build_expression_attributes(fields: &FieldMap, options: AttributeOptions) -> PlaceholderTable {
    let AttributeOptions {
        unused_value_keys,
        starting_table,
        expand_arrays,
    } = options;

    fields
        .iter()
        .fold(starting_table, |mut table, (field, value)| {
            table.names.insert(name_placeholder(field), field.clone());

            if unused_value_keys.contains(field) {
                return table;
            }

            match value {
                Value::Array(items) if expand_arrays => {
                    for (index, item) in items.iter().enumerate() {
                        table
                            .values
                            .insert(indexed_value_placeholder(field, index), item.clone());
                    }
                }
                _ => {
                    table.values.insert(value_placeholder(field), value.clone());
                }
            }

            table
        })
}
