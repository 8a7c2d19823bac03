//! A record of what a run did, step by step.
use crate::definition::IssueKind;
use crate::step::StepType;

pub mod formatter;

pub use formatter::TraceFormatter;

/// One thing the runner did with one step.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// A leaf step was handed to the executor and succeeded.
    Executed {
        step_type: StepType,
        result_variable: Option<String>,
    },
    /// A router picked a branch. `None` means the default path.
    Routed { path_id: Option<String> },
    /// A `for_each` step expanded into this many iterations.
    Iterated { iterations: usize },
    /// Start of one iteration of the enclosing `for_each` step.
    Iteration { index: usize },
    /// The step had validation issues and was skipped.
    Blocked { issues: Vec<IssueKind> },
    /// The executor reported a failure.
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub step_id: String,
    pub step_name: String,
    /// Nesting depth: root steps are 0, their children 1, and so on.
    pub depth: usize,
    pub event: TraceEvent,
}

impl TraceEntry {
    pub fn is_failure(&self) -> bool {
        matches!(self.event, TraceEvent::Failed { .. })
    }
}
