//! Pure evaluation of the branching and iteration parts of a workflow tree.
//!
//! Nothing here performs an action. Conditions, routers and iterators only read
//! a [`VariableContext`] and tell the caller which steps to run next, and in
//! which scope.
use crate::scope::VariableContext;
use crate::step::{StepConfig, StepNode};

pub mod condition;
pub mod iterator;
pub mod router;

pub use condition::evaluate;
pub use iterator::{Expansion, expand, source_items};
pub use router::{RouteDecision, path_matches, route};

/// What evaluating a single step yields.
pub enum StepEvaluation<'a> {
    /// A leaf step, to be handed to an action executor.
    Leaf,
    /// A router, with the branch it selected.
    Route(RouteDecision<'a>),
    /// An iterator, with one scope per element.
    Iterate(Expansion<'a>),
}

/// Dispatches a step to the evaluator for its type.
pub fn evaluate_step<'a>(step: &'a StepNode, scope: &'a VariableContext) -> StepEvaluation<'a> {
    match &step.config {
        StepConfig::ConditionalPaths(router) => StepEvaluation::Route(route(router, scope)),
        StepConfig::ForEach(iterator) => StepEvaluation::Iterate(expand(iterator, scope)),
        _ => StepEvaluation::Leaf,
    }
}
