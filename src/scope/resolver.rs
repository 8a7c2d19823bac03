use super::VariableContext;
use serde_json::Value;
use tracing::trace;

/// Resolves a dotted path such as `currentItem.id` or `trigger.customer.email` to a JSON value.
///
/// The first segment names a binding. The innermost frame that binds that name
/// wins, even if the rest of the path does not exist in it; outer bindings of
/// the same name are shadowed. Remaining segments walk object keys or array
/// indices. Returns `None` when anything along the way is missing.
pub fn lookup<'a>(path: &str, scope: &'a VariableContext) -> Option<&'a Value> {
    let mut segments = path.trim().split('.');
    let root = segments.next().filter(|s| !s.is_empty())?;
    let mut current = scope.get(root)?;
    for segment in segments {
        current = step_into(current, segment)?;
    }
    Some(current)
}

fn step_into<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    if segment.is_empty() {
        return None;
    }
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Resolves a dotted path to text. See [`lookup`] and [`stringify`].
pub fn resolve(path: &str, scope: &VariableContext) -> Option<String> {
    let resolved = lookup(path, scope).map(stringify);
    if resolved.is_none() {
        trace!(path, "variable path did not resolve");
    }
    resolved
}

/// Text form of a variable value, as substituted into templates.
///
/// Strings are used verbatim, `null` becomes empty text and everything else
/// uses its compact JSON form.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Whether a value counts as empty for `is_empty` conditions.
pub(crate) fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}
