//! Layered variable scopes and the templating that reads them.
use ahash::AHashMap;
use serde_json::Value;
use std::sync::Arc;

pub mod resolver;
pub mod template;

pub use resolver::{lookup, resolve, stringify};
pub use template::{Placeholder, Rendered, placeholders, render};

/// Scope bound from the triggering event payload.
pub const TRIGGER: &str = "trigger";
/// Scope bound to the current element inside a `for_each` body.
pub const CURRENT_ITEM: &str = "currentItem";
/// Scope bound to the value published by the most recent leaf step.
pub const STEP_OUTPUT: &str = "stepOutput";

#[derive(Debug, Clone, Default, PartialEq)]
struct Frame {
    scopes: AHashMap<String, Value>,
    results: AHashMap<String, Value>,
}

impl Frame {
    fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.get(name).or_else(|| self.results.get(name))
    }
}

/// A chain of variable frames, innermost last.
///
/// Frames are shared between a context and the children created from it.
/// Binding always writes to the innermost frame (copying it first if shared),
/// so a child never changes what its parent sees.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableContext {
    frames: Vec<Arc<Frame>>,
}

impl Default for VariableContext {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableContext {
    pub fn new() -> Self {
        Self {
            frames: vec![Arc::new(Frame::default())],
        }
    }

    /// A root context with `trigger` bound to the given payload.
    pub fn with_trigger(payload: Value) -> Self {
        let mut context = Self::new();
        context.bind_scope(TRIGGER, payload);
        context
    }

    /// A new context that sees every binding of `self` plus an empty innermost frame.
    pub fn child(&self) -> Self {
        let mut frames = self.frames.clone();
        frames.push(Arc::new(Frame::default()));
        Self { frames }
    }

    /// Number of frames in the chain.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn innermost(&mut self) -> &mut Frame {
        if self.frames.is_empty() {
            self.frames.push(Arc::new(Frame::default()));
        }
        let last = self.frames.len() - 1;
        Arc::make_mut(&mut self.frames[last])
    }

    /// Binds a named scope such as `trigger`, `currentItem` or `stepOutput`.
    pub fn bind_scope(&mut self, name: impl Into<String>, value: Value) {
        self.innermost().scopes.insert(name.into(), value);
    }

    pub fn bind_current_item(&mut self, item: Value) {
        self.bind_scope(CURRENT_ITEM, item);
    }

    /// Publishes a step result under `name` in the innermost frame.
    pub fn bind_result(&mut self, name: impl Into<String>, value: Value) {
        self.innermost().results.insert(name.into(), value);
    }

    /// Looks up a top-level binding, innermost frame first.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Looks up a result variable only, ignoring named scopes.
    pub fn get_result(&self, name: &str) -> Option<&Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.results.get(name))
    }

    /// Names of every result variable visible from this context.
    pub fn result_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .frames
            .iter()
            .flat_map(|frame| frame.results.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Resolves a dotted path to its raw JSON value.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        resolver::lookup(path, self)
    }

    /// Resolves a dotted path to its text form.
    pub fn resolve(&self, path: &str) -> Option<String> {
        resolver::resolve(path, self)
    }
}
