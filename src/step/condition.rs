use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Comparison applied by a single [`Condition`].
///
/// Operator names outside the supported set are kept as [`Operator::Unsupported`]
/// so a document that carries one still loads and saves unchanged. Validation
/// reports them; evaluation treats them as never matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Operator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
    Unsupported(String),
}

impl Operator {
    pub const SUPPORTED: &'static [Operator] = &[
        Operator::Equals,
        Operator::NotEquals,
        Operator::Contains,
        Operator::NotContains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::In,
        Operator::NotIn,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
    ];

    pub fn parse(name: &str) -> Self {
        match name {
            "equals" => Operator::Equals,
            "not_equals" => Operator::NotEquals,
            "contains" => Operator::Contains,
            "not_contains" => Operator::NotContains,
            "starts_with" => Operator::StartsWith,
            "ends_with" => Operator::EndsWith,
            "in" => Operator::In,
            "not_in" => Operator::NotIn,
            "greater_than" => Operator::GreaterThan,
            "less_than" => Operator::LessThan,
            "is_empty" => Operator::IsEmpty,
            "is_not_empty" => Operator::IsNotEmpty,
            other => Operator::Unsupported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::IsEmpty => "is_empty",
            Operator::IsNotEmpty => "is_not_empty",
            Operator::Unsupported(name) => name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Operator::Unsupported(_))
    }

    /// The operator of a condition whose document has no `operator` key.
    /// Validation reports it like any other unsupported operator.
    pub fn missing() -> Self {
        Operator::Unsupported(String::new())
    }

    /// Whether the operator compares against `Condition::value` at all.
    pub fn uses_value(&self) -> bool {
        !matches!(self, Operator::IsEmpty | Operator::IsNotEmpty)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Operator::parse(&name))
    }
}

/// One comparison between a variable path and a (templated) value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    /// Dotted variable path, e.g. `trigger.category`.
    pub field: String,
    #[serde(default = "Operator::missing")]
    pub operator: Operator,
    pub value: String,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operator.uses_value() {
            write!(f, "{} {} '{}'", self.field, self.operator, self.value)
        } else {
            write!(f, "{} {}", self.field, self.operator)
        }
    }
}
