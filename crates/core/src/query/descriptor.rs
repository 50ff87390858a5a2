use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::expression::FieldMatch;

use super::error::QueryError;

/// Control field holding the maximum result count.
pub const LIMIT_FIELD: &str = "$limit";
/// Control field holding the sort direction.
pub const ASCENDING_FIELD: &str = "$isAscending";
/// Control field holding the pagination cursor.
pub const START_FROM_FIELD: &str = "$startFromId";

const CONTROL_PREFIX: char = '$';

/// A declarative query: per-field matchers plus scan directives.
///
/// In JSON form the directives are the `$`-prefixed control fields and every
/// other key is a field matcher:
///
/// ```json
/// { "$limit": 10, "status": "open", "genres": ["a", "b"], "deletedAt": { "$isNull": true } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct QueryDescriptor {
    pub limit: Option<u32>,
    pub is_ascending: Option<bool>,
    pub start_key: Option<Value>,
    fields: Vec<(String, FieldMatch)>,
}

impl QueryDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the matcher for `field`, keeping its position if already present.
    pub fn with_field(mut self, field: impl Into<String>, matcher: impl Into<FieldMatch>) -> Self {
        self.set_field(field, matcher);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_ascending(mut self, is_ascending: bool) -> Self {
        self.is_ascending = Some(is_ascending);
        self
    }

    pub fn with_start_key(mut self, start_key: impl Into<Value>) -> Self {
        self.start_key = Some(start_key.into());
        self
    }

    /// Sets the matcher for `field`, keeping its position if already present.
    pub fn set_field(&mut self, field: impl Into<String>, matcher: impl Into<FieldMatch>) {
        let field = field.into();
        let matcher = matcher.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = matcher,
            None => self.fields.push((field, matcher)),
        }
    }

    pub fn field(&self, field: &str) -> Option<&FieldMatch> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, matcher)| matcher)
    }

    /// Field matchers in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldMatch)> {
        self.fields
            .iter()
            .map(|(name, matcher)| (name.as_str(), matcher))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for QueryDescriptor {
    type Error = QueryError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut query = QueryDescriptor::new();

        for (key, value) in map {
            match key.as_str() {
                LIMIT_FIELD => query.limit = parse_limit(value)?,
                ASCENDING_FIELD => query.is_ascending = parse_ascending(value)?,
                START_FROM_FIELD => query.start_key = Some(value).filter(|v| !v.is_null()),
                _ if key.starts_with(CONTROL_PREFIX) => {
                    return Err(QueryError::InvalidControlField {
                        field: key,
                        reason: "unknown control field".to_string(),
                    })
                }
                _ => query.set_field(key, value),
            }
        }

        Ok(query)
    }
}

impl From<QueryDescriptor> for Map<String, Value> {
    fn from(query: QueryDescriptor) -> Self {
        let mut map = Map::new();
        if let Some(limit) = query.limit {
            map.insert(LIMIT_FIELD.to_string(), Value::from(limit));
        }
        if let Some(is_ascending) = query.is_ascending {
            map.insert(ASCENDING_FIELD.to_string(), Value::Bool(is_ascending));
        }
        if let Some(start_key) = query.start_key {
            map.insert(START_FROM_FIELD.to_string(), start_key);
        }
        for (field, matcher) in query.fields {
            map.insert(field, matcher.into());
        }
        map
    }
}

fn parse_limit(value: Value) -> Result<Option<u32>, QueryError> {
    if value.is_null() {
        return Ok(None);
    }
    let integral_float = value
        .as_f64()
        .filter(|limit| limit.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(limit))
        .map(|limit| limit as u64);
    value
        .as_u64()
        .or(integral_float)
        .and_then(|limit| u32::try_from(limit).ok())
        .map(Some)
        .ok_or_else(|| QueryError::InvalidControlField {
            field: LIMIT_FIELD.to_string(),
            reason: format!("expected a non-negative integer, got {value}"),
        })
}

fn parse_ascending(value: Value) -> Result<Option<bool>, QueryError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(is_ascending) => Ok(Some(is_ascending)),
        other => Err(QueryError::InvalidControlField {
            field: ASCENDING_FIELD.to_string(),
            reason: format!("expected a boolean, got {other}"),
        }),
    }
}
