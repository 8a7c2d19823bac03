//! Structural checks on a workflow tree.
//!
//! Validation never fails: it collects every issue it finds so an editor can
//! show them all at once. The runner refuses to execute a step that has a
//! blocking issue (see [`IssueKind::blocks_execution`]).
use super::WorkflowDefinition;
use super::visit::flatten;
use crate::step::StepNode;
use ahash::AHashSet;
use std::fmt;
use thiserror::Error;

/// A single problem with one step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    #[error("step id is empty")]
    EmptyStepId,

    #[error("step id is used by more than one step")]
    DuplicateStepId,

    #[error("required field '{field}' is empty")]
    MissingField { field: &'static str },

    #[error("condition path '{path_id}' uses unsupported operator '{operator}'")]
    UnsupportedOperator { path_id: String, operator: String },

    #[error("condition path '{path_id}' has no conditions and can never match")]
    EmptyConditionPath { path_id: String },

    #[error("condition path '{path_id}' has a condition without a field")]
    EmptyConditionField { path_id: String },

    #[error("router has no condition paths and an empty default path")]
    EmptyRouter,

    #[error("customVariables is not a JSON object: {message}")]
    MalformedCustomVariables { message: String },

    #[error("sourceVariable is empty")]
    EmptySourceVariable,
}

impl IssueKind {
    /// Whether the runner must skip a step carrying this issue.
    ///
    /// A condition path without conditions, or with a field-less condition,
    /// simply never matches; routing skips it and the router still runs.
    pub fn blocks_execution(&self) -> bool {
        !matches!(
            self,
            IssueKind::EmptyConditionPath { .. } | IssueKind::EmptyConditionField { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub step_id: String,
    pub step_name: String,
    pub kind: IssueKind,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step '{}' ({}): {}", self.step_name, self.step_id, self.kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues that would make the runner skip their step.
    pub fn blocking(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.kind.blocks_execution())
    }

    pub fn issues_for<'a>(&'a self, step_id: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues.iter().filter(move |issue| issue.step_id == step_id)
    }
}

/// Issues local to one step. Does not descend into child steps.
pub fn validate_step(step: &StepNode) -> Vec<IssueKind> {
    let mut issues = Vec::new();
    if step.id.trim().is_empty() {
        issues.push(IssueKind::EmptyStepId);
    }
    step.config.check(&mut issues);
    issues
}

/// Checks every step of a workflow, plus id uniqueness across the whole tree.
pub fn validate(definition: &WorkflowDefinition) -> ValidationReport {
    let mut seen = AHashSet::new();
    let mut issues = Vec::new();

    for (step, _) in flatten(definition.steps()) {
        let mut kinds = validate_step(step);
        if !step.id.is_empty() && !seen.insert(step.id.as_str()) {
            kinds.push(IssueKind::DuplicateStepId);
        }
        issues.extend(kinds.into_iter().map(|kind| ValidationIssue {
            step_id: step.id.clone(),
            step_name: step.name.clone(),
            kind,
        }));
    }

    ValidationReport { issues }
}
