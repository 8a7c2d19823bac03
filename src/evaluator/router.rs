use super::condition::evaluate;
use crate::scope::VariableContext;
use crate::step::{ConditionPath, ConditionalPathsConfig, StepNode};
use std::sync::Arc;
use tracing::debug;

/// The branch chosen by a conditional router.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteDecision<'a> {
    /// The matching path, or `None` when the default path was taken.
    pub path_id: Option<&'a str>,
    pub steps: &'a [Arc<StepNode>],
}

impl RouteDecision<'_> {
    pub fn is_default(&self) -> bool {
        self.path_id.is_none()
    }
}

/// A path matches iff it has at least one condition and every condition has a
/// field and holds.
pub fn path_matches(path: &ConditionPath, scope: &VariableContext) -> bool {
    !path.conditions.is_empty()
        && path
            .conditions
            .iter()
            .all(|c| !c.field.trim().is_empty() && evaluate(c, scope))
}

/// Picks the first matching path in declaration order, else the default path.
pub fn route<'a>(router: &'a ConditionalPathsConfig, scope: &VariableContext) -> RouteDecision<'a> {
    match router.conditions.iter().find(|path| path_matches(path, scope)) {
        Some(path) => {
            debug!(path_id = %path.id, "condition path matched");
            RouteDecision {
                path_id: Some(&path.id),
                steps: &path.path_steps,
            }
        }
        None => {
            debug!("no condition path matched, taking default path");
            RouteDecision {
                path_id: None,
                steps: &router.default_path.steps,
            }
        }
    }
}
