use super::{TraceEntry, TraceEvent};
use crate::definition::{WorkflowDefinition, flatten};
use crate::step::{StepConfig, StepNode};
use itertools::Itertools;

/// Formats run traces and workflow outlines into human-readable text.
pub struct TraceFormatter;

impl TraceFormatter {
    /// One line per trace entry, indented by nesting depth.
    pub fn format_trace(trace: &[TraceEntry]) -> String {
        trace.iter().map(Self::format_entry).join("\n")
    }

    fn format_entry(entry: &TraceEntry) -> String {
        let indent = "  ".repeat(entry.depth);
        let step = format!("'{}' ({})", entry.step_name, entry.step_id);
        let line = match &entry.event {
            TraceEvent::Executed {
                step_type,
                result_variable: Some(name),
            } => format!("ran {step} [{step_type}] -> {name}"),
            TraceEvent::Executed { step_type, .. } => format!("ran {step} [{step_type}]"),
            TraceEvent::Routed { path_id: Some(path) } => format!("routed {step} to path '{path}'"),
            TraceEvent::Routed { path_id: None } => format!("routed {step} to the default path"),
            TraceEvent::Iterated { iterations } => {
                format!("iterating {step} over {iterations} item(s)")
            }
            TraceEvent::Iteration { index } => format!("iteration {index} of {step}"),
            TraceEvent::Blocked { issues } => {
                format!("skipped {step}: {}", issues.iter().join("; "))
            }
            TraceEvent::Failed { message } => format!("failed {step}: {message}"),
        };
        format!("{indent}{line}")
    }

    /// A tree view of a workflow: one line per step, plus one per router branch.
    pub fn format_outline(definition: &WorkflowDefinition) -> String {
        let mut lines = Vec::new();
        for (step, depth) in flatten(definition.steps()) {
            let indent = "  ".repeat(depth);
            lines.push(format!(
                "{indent}- {} ({}) [{}]",
                step.name,
                step.id,
                step.step_type()
            ));
            lines.extend(
                Self::branch_summary(step)
                    .into_iter()
                    .map(|branch| format!("{indent}    {branch}")),
            );
        }
        lines.join("\n")
    }

    fn branch_summary(step: &StepNode) -> Vec<String> {
        match &step.config {
            StepConfig::ConditionalPaths(router) => router
                .conditions
                .iter()
                .map(|path| {
                    let conditions = if path.conditions.is_empty() {
                        "never".to_string()
                    } else {
                        path.conditions.iter().join(" AND ")
                    };
                    format!(
                        "path '{}' when {} ({} step(s))",
                        path.id,
                        conditions,
                        path.path_steps.len()
                    )
                })
                .chain(std::iter::once(format!(
                    "default ({} step(s))",
                    router.default_path.steps.len()
                )))
                .collect(),
            StepConfig::ForEach(iterator) => {
                vec![format!("over {}", iterator.source_variable)]
            }
            _ => Vec::new(),
        }
    }
}
