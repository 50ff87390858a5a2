use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::placeholder::{indexed_value_placeholder, name_placeholder, value_placeholder};

/// Filter operators recognized inside an operator object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    NotContains,
    Contains,
    IsNull,
    NotNull,
    NotEqual,
    GreaterThan,
    LessThan,
}

impl Operator {
    /// Recognized operators in match order. When an operator object carries
    /// several tokens, only the first one in this list applies.
    pub const PRECEDENCE: [Operator; 7] = [
        Operator::NotContains,
        Operator::Contains,
        Operator::IsNull,
        Operator::NotNull,
        Operator::NotEqual,
        Operator::GreaterThan,
        Operator::LessThan,
    ];

    /// Wire token for the operator.
    pub fn token(self) -> &'static str {
        match self {
            Operator::NotContains => "$notContains",
            Operator::Contains => "$contains",
            Operator::IsNull => "$isNull",
            Operator::NotNull => "$notNull",
            Operator::NotEqual => "$notEq",
            Operator::GreaterThan => "$gt",
            Operator::LessThan => "$lt",
        }
    }

    /// Parses a wire token.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::PRECEDENCE.into_iter().find(|op| op.token() == token)
    }

    /// Existence checks never reference a value placeholder.
    pub fn is_existence_check(self) -> bool {
        matches!(self, Operator::IsNull | Operator::NotNull)
    }

    /// Renders the clause for `field`.
    pub fn clause(self, field: &str) -> String {
        let name = name_placeholder(field);
        let value = value_placeholder(field);
        match self {
            Operator::NotContains => format!("not contains({name}, {value})"),
            Operator::Contains => format!("contains({name}, {value})"),
            Operator::IsNull => format!("attribute_not_exists({name})"),
            Operator::NotNull => format!("attribute_exists({name})"),
            Operator::NotEqual => format!("{name} <> {value}"),
            Operator::GreaterThan => format!("{name} > {value}"),
            Operator::LessThan => format!("{name} < {value}"),
        }
    }
}

/// An operator object such as `{"$gt": "2020-01-01"}`.
///
/// Keys outside the operator vocabulary are kept; an object with no
/// recognized key behaves as equality against its first value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Condition(Map<String, Value>);

impl Condition {
    /// Creates a single-operator condition.
    pub fn new(operator: Operator, operand: impl Into<Value>) -> Self {
        let mut map = Map::new();
        map.insert(operator.token().to_string(), operand.into());
        Self(map)
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// The honored operator, if any key is recognized.
    pub fn operator(&self) -> Option<Operator> {
        Operator::PRECEDENCE
            .into_iter()
            .find(|op| self.0.contains_key(op.token()))
    }

    /// The operand used for the value placeholder: the object's first value.
    pub fn operand(&self) -> Value {
        self.0.values().next().cloned().unwrap_or(Value::Null)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// How a single field is matched in a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum FieldMatch {
    /// `#f = :f`
    Equals(Value),
    /// `#f IN (:f0, :f1, ...)`
    In(Vec<Value>),
    /// Operator object.
    Condition(Condition),
}

impl FieldMatch {
    pub fn not_contains(operand: impl Into<Value>) -> Self {
        Self::Condition(Condition::new(Operator::NotContains, operand))
    }

    pub fn contains(operand: impl Into<Value>) -> Self {
        Self::Condition(Condition::new(Operator::Contains, operand))
    }

    pub fn is_null() -> Self {
        Self::Condition(Condition::new(Operator::IsNull, true))
    }

    pub fn not_null() -> Self {
        Self::Condition(Condition::new(Operator::NotNull, true))
    }

    pub fn not_equal(operand: impl Into<Value>) -> Self {
        Self::Condition(Condition::new(Operator::NotEqual, operand))
    }

    pub fn greater_than(operand: impl Into<Value>) -> Self {
        Self::Condition(Condition::new(Operator::GreaterThan, operand))
    }

    pub fn less_than(operand: impl Into<Value>) -> Self {
        Self::Condition(Condition::new(Operator::LessThan, operand))
    }

    /// The operator in effect, `None` for equality and IN lists.
    pub fn operator(&self) -> Option<Operator> {
        match self {
            FieldMatch::Condition(condition) => condition.operator(),
            _ => None,
        }
    }

    pub fn is_existence_check(&self) -> bool {
        self.operator().is_some_and(Operator::is_existence_check)
    }

    /// The value handed to the attribute builder. Operator objects collapse to
    /// their operand; IN lists stay arrays so they can be expanded.
    pub fn operand(&self) -> Value {
        match self {
            FieldMatch::Equals(value) => value.clone(),
            FieldMatch::In(values) => Value::Array(values.clone()),
            FieldMatch::Condition(condition) => condition.operand(),
        }
    }

    /// Renders the filter clause for `field`.
    pub fn clause(&self, field: &str) -> String {
        match self {
            FieldMatch::In(values) => {
                let placeholders = (0..values.len())
                    .map(|index| indexed_value_placeholder(field, index))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} IN ({placeholders})", name_placeholder(field))
            }
            _ => match self.operator() {
                Some(operator) => operator.clause(field),
                None => equality_clause(field),
            },
        }
    }
}

/// `#<field> = :<field>`
pub(crate) fn equality_clause(field: &str) -> String {
    format!("{} = {}", name_placeholder(field), value_placeholder(field))
}

impl From<Value> for FieldMatch {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(values) => FieldMatch::In(values),
            Value::Object(map) => FieldMatch::Condition(Condition::from_map(map)),
            value => FieldMatch::Equals(value),
        }
    }
}

impl From<FieldMatch> for Value {
    fn from(matcher: FieldMatch) -> Self {
        match matcher {
            FieldMatch::Equals(value) => value,
            FieldMatch::In(values) => Value::Array(values),
            FieldMatch::Condition(condition) => Value::Object(condition.0),
        }
    }
}

impl From<Condition> for FieldMatch {
    fn from(condition: Condition) -> Self {
        FieldMatch::Condition(condition)
    }
}
