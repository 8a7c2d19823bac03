use super::{VariableContext, resolver};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;

/// Matches `{{scope.path}}` or a legacy bare `{name}`.
///
/// The scoped form is tried first, so the inner braces of `{{name}}` are never
/// read as a legacy placeholder.
static PLACEHOLDER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap()
});

/// A placeholder found in a template string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `{{scope.path}}`, resolved against every scope.
    Scoped(String),
    /// `{name}`, resolved against result variables only.
    Legacy(String),
}

impl Placeholder {
    fn from_captures(caps: &Captures<'_>) -> Self {
        match (caps.get(1), caps.get(2)) {
            (Some(path), _) => Placeholder::Scoped(path.as_str().to_string()),
            (None, Some(name)) => Placeholder::Legacy(name.as_str().to_string()),
            (None, None) => Placeholder::Scoped(String::new()),
        }
    }

    fn resolve(&self, scope: &VariableContext) -> Option<String> {
        match self {
            Placeholder::Scoped(path) => resolver::resolve(path, scope),
            Placeholder::Legacy(name) => scope.get_result(name).map(resolver::stringify),
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Scoped(path) => write!(f, "{{{{{}}}}}", path),
            Placeholder::Legacy(name) => write!(f, "{{{}}}", name),
        }
    }
}

/// The outcome of substituting every placeholder in a string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Placeholders that resolved to nothing. Their literal text is left in `text`.
    pub unresolved: Vec<Placeholder>,
}

impl Rendered {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Substitutes every placeholder in `template`. Never fails: misses stay literal and are reported.
pub fn render(template: &str, scope: &VariableContext) -> Rendered {
    let mut unresolved = Vec::new();
    let text = PLACEHOLDER_PATTERN
        .replace_all(template, |caps: &Captures<'_>| {
            let placeholder = Placeholder::from_captures(caps);
            match placeholder.resolve(scope) {
                Some(value) => value,
                None => {
                    let literal = caps[0].to_string();
                    unresolved.push(placeholder);
                    literal
                }
            }
        })
        .into_owned();
    Rendered { text, unresolved }
}

/// Lists the placeholders of a template in order of appearance.
pub fn placeholders(template: &str) -> Vec<Placeholder> {
    PLACEHOLDER_PATTERN
        .captures_iter(template)
        .map(|caps| Placeholder::from_captures(&caps))
        .collect()
}

/// If `text` is exactly one `{{path}}` placeholder, returns the path.
pub(crate) fn sole_scoped_path(text: &str) -> Option<&str> {
    let caps = PLACEHOLDER_PATTERN.captures(text.trim())?;
    let whole = caps.get(0)?;
    if whole.len() != text.trim().len() {
        return None;
    }
    caps.get(1).map(|m| m.as_str())
}
