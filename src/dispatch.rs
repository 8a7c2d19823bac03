use crate::error::ActionError;
use crate::scope::{Placeholder, VariableContext, render};
use crate::step::{StepConfig, StepNode, StepType};
use serde_json::Value;

/// A leaf step ready to be performed, with every template in its config resolved.
#[derive(Debug, Clone, Copy)]
pub struct ActionRequest<'a> {
    pub step: &'a StepNode,
    /// The step's config after placeholder substitution.
    pub config: &'a StepConfig,
    /// The scope the step runs in. Read only.
    pub scope: &'a VariableContext,
}

impl ActionRequest<'_> {
    pub fn step_id(&self) -> &str {
        &self.step.id
    }

    pub fn step_name(&self) -> &str {
        &self.step.name
    }

    pub fn step_type(&self) -> StepType {
        self.config.step_type()
    }
}

/// What an executor reports back for a completed action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    /// Where to publish `value` as a result variable, if anywhere.
    pub result_variable: Option<String>,
    pub value: Value,
}

impl ActionOutcome {
    /// An outcome that publishes nothing beyond `stepOutput`.
    pub fn new(value: Value) -> Self {
        Self {
            result_variable: None,
            value,
        }
    }

    pub fn named(result_variable: impl Into<String>, value: Value) -> Self {
        Self {
            result_variable: Some(result_variable.into()),
            value,
        }
    }

    /// Publishes `value` under the config's `resultVariable`, when it names one.
    pub fn for_config(config: &StepConfig, value: Value) -> Self {
        Self {
            result_variable: config
                .result_variable()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            value,
        }
    }
}

/// The boundary to whatever performs leaf steps: integrations, queries, messages.
///
/// The workflow model never performs side effects itself. A runner hands every
/// leaf step to an executor and binds what comes back.
pub trait ActionExecutor {
    fn execute(&self, request: &ActionRequest<'_>) -> Result<ActionOutcome, ActionError>;
}

impl<F> ActionExecutor for F
where
    F: Fn(&ActionRequest<'_>) -> Result<ActionOutcome, ActionError>,
{
    fn execute(&self, request: &ActionRequest<'_>) -> Result<ActionOutcome, ActionError> {
        self(request)
    }
}

/// Performs nothing. Echoes each resolved config back as the step's result.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunExecutor;

impl ActionExecutor for DryRunExecutor {
    fn execute(&self, request: &ActionRequest<'_>) -> Result<ActionOutcome, ActionError> {
        let value = serde_json::to_value(request.config)
            .map_err(|e| ActionError::new(format!("could not echo config: {e}")))?;
        Ok(ActionOutcome::for_config(request.config, value))
    }
}

/// Substitutes placeholders in every template field of a config.
///
/// Returns the resolved copy plus every placeholder that resolved to nothing,
/// in field order.
pub fn resolve_config(config: &StepConfig, scope: &VariableContext) -> (StepConfig, Vec<Placeholder>) {
    let mut resolved = config.clone();
    let mut unresolved = Vec::new();
    resolved.visit_templates_mut(&mut |text: &mut String| {
        let rendered = render(text, scope);
        unresolved.extend(rendered.unresolved);
        *text = rendered.text;
    });
    (resolved, unresolved)
}
