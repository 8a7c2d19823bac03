use super::condition::Condition;
use super::config::StepKind;
use super::node::StepList;
use crate::definition::validation::IssueKind;
use serde::{Deserialize, Serialize};

/// An AND-combined set of conditions plus the steps to run when they all hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConditionPath {
    pub id: String,
    pub conditions: Vec<Condition>,
    pub path_steps: StepList,
}

impl ConditionPath {
    pub fn new(id: impl Into<String>, conditions: Vec<Condition>, path_steps: StepList) -> Self {
        Self {
            id: id.into(),
            conditions,
            path_steps,
        }
    }
}

/// Steps run when no condition path matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultPath {
    pub steps: StepList,
}

/// Config of a `conditional_paths` step. Path order is significant: routing is first-match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConditionalPathsConfig {
    pub conditions: Vec<ConditionPath>,
    pub default_path: DefaultPath,
}

impl ConditionalPathsConfig {
    pub fn path(&self, path_id: &str) -> Option<&ConditionPath> {
        self.conditions.iter().find(|p| p.id == path_id)
    }
}

impl StepKind for ConditionalPathsConfig {
    fn check(&self, issues: &mut Vec<IssueKind>) {
        if self.conditions.is_empty() && self.default_path.steps.is_empty() {
            issues.push(IssueKind::EmptyRouter);
        }
        for path in &self.conditions {
            if path.conditions.is_empty() {
                issues.push(IssueKind::EmptyConditionPath {
                    path_id: path.id.clone(),
                });
            }
            for condition in &path.conditions {
                if condition.field.trim().is_empty() {
                    issues.push(IssueKind::EmptyConditionField {
                        path_id: path.id.clone(),
                    });
                }
                if !condition.operator.is_supported() {
                    issues.push(IssueKind::UnsupportedOperator {
                        path_id: path.id.clone(),
                        operator: condition.operator.to_string(),
                    });
                }
            }
        }
    }
}

/// Config of a `for_each` step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForEachConfig {
    /// Path of an array-valued variable, bare (`trigger.items`) or templated (`{{trigger.items}}`).
    pub source_variable: String,
    pub child_steps: StepList,
}

impl StepKind for ForEachConfig {
    fn check(&self, issues: &mut Vec<IssueKind>) {
        if self.source_variable.trim().is_empty() {
            issues.push(IssueKind::EmptySourceVariable);
        }
    }
}
