use crate::scope::template::sole_scoped_path;
use crate::scope::{VariableContext, lookup};
use crate::step::ForEachConfig;
use serde_json::Value;
use tracing::debug;

/// The elements a `for_each` step iterates over.
///
/// A missing or non-array source yields no elements. A string holding a JSON
/// array is accepted, since payloads often carry lists as text.
pub fn source_items(iterator: &ForEachConfig, scope: &VariableContext) -> Vec<Value> {
    let path = sole_scoped_path(&iterator.source_variable)
        .unwrap_or(iterator.source_variable.trim());
    match lookup(path, scope) {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => items,
            _ => {
                debug!(source = path, "for_each source is a string, not a list");
                Vec::new()
            }
        },
        Some(_) => {
            debug!(source = path, "for_each source is not a list");
            Vec::new()
        }
        None => {
            debug!(source = path, "for_each source is unbound");
            Vec::new()
        }
    }
}

/// One child scope per element, each binding `currentItem` to that element.
pub struct Expansion<'a> {
    parent: &'a VariableContext,
    items: std::vec::IntoIter<Value>,
}

impl Iterator for Expansion<'_> {
    type Item = VariableContext;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.next()?;
        let mut frame = self.parent.child();
        frame.bind_current_item(item);
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl ExactSizeIterator for Expansion<'_> {}

/// Expands a `for_each` step into its iteration scopes, in source order.
pub fn expand<'a>(iterator: &ForEachConfig, scope: &'a VariableContext) -> Expansion<'a> {
    Expansion {
        parent: scope,
        items: source_items(iterator, scope).into_iter(),
    }
}
