//! The workflow definition document: an ordered list of root steps.
//!
//! A definition is persisted and loaded as a whole. Every structural edit (see
//! [`edit`]) returns a new definition that shares all untouched subtrees with
//! the old one.
use crate::error::DefinitionError;
use crate::step::node::RawStep;
use crate::step::{StepList, StepNode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub mod edit;
pub mod validation;
pub mod visit;

pub use edit::StepSlot;
pub use validation::{IssueKind, ValidationIssue, ValidationReport, validate, validate_step};
pub use visit::{StepVisitor, find_step, flatten, walk};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowDefinition {
    steps: StepList,
}

impl WorkflowDefinition {
    /// An empty workflow.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: impl IntoIterator<Item = StepNode>) -> Self {
        Self {
            steps: steps.into_iter().map(Arc::new).collect(),
        }
    }

    pub(crate) fn from_list(steps: StepList) -> Self {
        Self { steps }
    }

    /// Root steps, in execution order.
    pub fn steps(&self) -> &[Arc<StepNode>] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of steps at every depth.
    pub fn len(&self) -> usize {
        let mut count = 0;
        walk(&self.steps, &mut |_: &StepNode, _: usize, _: Option<&StepNode>| count += 1);
        count
    }

    /// Looks up a step by id at any depth.
    pub fn find_step(&self, id: &str) -> Option<&Arc<StepNode>> {
        find_step(&self.steps, id)
    }

    pub fn contains_step(&self, id: &str) -> bool {
        self.find_step(id).is_some()
    }

    /// Every step id in depth-first document order.
    pub fn step_ids(&self) -> Vec<&str> {
        flatten(&self.steps)
            .into_iter()
            .map(|(step, _)| step.id.as_str())
            .collect()
    }

    /// Parses a workflow document (a JSON array of steps), applying load-time repairs.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let raw: Vec<RawStep> = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, DefinitionError> {
        let raw: Vec<RawStep> = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: Vec<RawStep>) -> Result<Self, DefinitionError> {
        let steps = raw
            .into_iter()
            .map(|step| StepNode::from_raw(step).map(Arc::new))
            .collect::<Result<_, _>>()?;
        Ok(Self { steps })
    }

    pub fn to_json(&self) -> Result<String, DefinitionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, DefinitionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a workflow document from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Saves the whole document as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DefinitionError> {
        let path = path.as_ref();
        fs::write(path, self.to_json_pretty()?).map_err(|source| DefinitionError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}
