use crate::scope::resolver::{is_empty_value, stringify};
use crate::scope::template::{render, sole_scoped_path};
use crate::scope::{VariableContext, lookup};
use crate::step::{Condition, Operator};
use serde_json::Value;

/// The left-hand side of a condition after resolution.
struct FieldValue<'a> {
    text: String,
    raw: Option<&'a Value>,
    empty: bool,
}

impl<'a> FieldValue<'a> {
    fn resolve(field: &str, scope: &'a VariableContext) -> Self {
        let path = sole_scoped_path(field).unwrap_or(field);
        if !path.contains('{') {
            let raw = lookup(path, scope);
            return Self {
                text: raw.map(stringify).unwrap_or_default(),
                raw,
                empty: is_empty_value(raw),
            };
        }

        // A field mixing literal text and placeholders: any miss counts as empty.
        let rendered = render(field, scope);
        let text = if rendered.is_complete() {
            rendered.text
        } else {
            String::new()
        };
        Self {
            empty: text.is_empty(),
            text,
            raw: None,
        }
    }
}

/// Evaluates one condition against a scope. Never fails: unresolvable fields read as empty text.
pub fn evaluate(condition: &Condition, scope: &VariableContext) -> bool {
    let actual = FieldValue::resolve(&condition.field, scope);
    let expected = if condition.operator.uses_value() {
        render(&condition.value, scope).text
    } else {
        String::new()
    };

    match &condition.operator {
        Operator::Equals => actual.text == expected,
        Operator::NotEquals => actual.text != expected,
        Operator::Contains => contains(&actual, &expected),
        Operator::NotContains => !contains(&actual, &expected),
        Operator::StartsWith => actual.text.starts_with(&expected),
        Operator::EndsWith => actual.text.ends_with(&expected),
        Operator::In => is_listed(&actual.text, &expected),
        Operator::NotIn => !is_listed(&actual.text, &expected),
        Operator::GreaterThan => compare_numbers(&actual.text, &expected, |a, b| a > b),
        Operator::LessThan => compare_numbers(&actual.text, &expected, |a, b| a < b),
        Operator::IsEmpty => actual.empty,
        Operator::IsNotEmpty => !actual.empty,
        Operator::Unsupported(_) => false,
    }
}

/// Substring check on text; membership check when the field is an array.
fn contains(actual: &FieldValue<'_>, expected: &str) -> bool {
    match actual.raw {
        Some(Value::Array(items)) => items.iter().any(|item| stringify(item) == expected),
        _ => actual.text.contains(expected),
    }
}

/// `value` is a comma separated list; entries are trimmed and blanks ignored.
fn is_listed(actual: &str, list: &str) -> bool {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .any(|entry| entry == actual)
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

fn compare_numbers<F>(actual: &str, expected: &str, f: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (parse_number(actual), parse_number(expected)) {
        (Some(a), Some(b)) => f(a, b),
        _ => false,
    }
}
