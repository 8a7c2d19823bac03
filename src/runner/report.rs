use crate::error::ActionError;
use crate::scope::{Placeholder, VariableContext};
use crate::trace::TraceEntry;

/// A placeholder that resolved to nothing while preparing a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedVariable {
    pub step_id: String,
    pub step_name: String,
    pub placeholder: Placeholder,
}

/// An executor failure the run continued past, or the one that stopped it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step_id: String,
    pub step_name: String,
    pub error: ActionError,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub trace: Vec<TraceEntry>,
    pub unresolved: Vec<UnresolvedVariable>,
    pub failures: Vec<StepFailure>,
    /// Leaf steps the executor completed successfully.
    pub steps_executed: usize,
    /// The root scope after the last step, with root-level results bound.
    pub scope: VariableContext,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.unresolved.is_empty()
    }

    /// Ids of executed leaf steps, in execution order.
    pub fn executed_step_ids(&self) -> Vec<&str> {
        self.trace
            .iter()
            .filter(|entry| matches!(entry.event, crate::trace::TraceEvent::Executed { .. }))
            .map(|entry| entry.step_id.as_str())
            .collect()
    }
}
