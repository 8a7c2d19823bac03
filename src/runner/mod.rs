//! A sequential reference runner for workflow trees.
//!
//! The runner walks the tree depth-first in document order. Routers and
//! iterators are evaluated in place; every leaf is handed to an
//! [`ActionExecutor`]. Each container body runs in its own child scope, so
//! results published inside a branch or an iteration are not visible after it.
use crate::definition::{IssueKind, WorkflowDefinition, validate_step};
use crate::dispatch::{ActionExecutor, ActionRequest, resolve_config};
use crate::error::RunError;
use crate::evaluator::{StepEvaluation, evaluate_step};
use crate::scope::{STEP_OUTPUT, VariableContext};
use crate::step::{StepConfig, StepNode};
use crate::trace::{TraceEntry, TraceEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

mod report;

pub use report::{RunReport, StepFailure, UnresolvedVariable};

/// Configures and creates a [`Runner`].
pub struct RunnerBuilder<E> {
    executor: E,
    max_iterations: Option<usize>,
    continue_on_error: bool,
}

impl<E: ActionExecutor> RunnerBuilder<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            max_iterations: None,
            continue_on_error: false,
        }
    }

    /// Refuses to run a `for_each` step whose source holds more than `limit` items.
    pub fn max_iterations(mut self, limit: usize) -> Self {
        self.max_iterations = Some(limit);
        self
    }

    /// Keeps going after an executor failure instead of aborting the run.
    pub fn continue_on_error(mut self, enabled: bool) -> Self {
        self.continue_on_error = enabled;
        self
    }

    pub fn build(self) -> Runner<E> {
        Runner {
            executor: self.executor,
            max_iterations: self.max_iterations,
            continue_on_error: self.continue_on_error,
        }
    }
}

pub struct Runner<E> {
    executor: E,
    max_iterations: Option<usize>,
    continue_on_error: bool,
}

impl<E: ActionExecutor> Runner<E> {
    pub fn builder(executor: E) -> RunnerBuilder<E> {
        RunnerBuilder::new(executor)
    }

    /// A runner with default settings.
    pub fn new(executor: E) -> Self {
        RunnerBuilder::new(executor).build()
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Runs a whole workflow with `trigger` bound as the trigger payload.
    pub fn run(&self, definition: &WorkflowDefinition, trigger: Value) -> Result<RunReport, RunError> {
        self.run_in(definition.steps(), VariableContext::with_trigger(trigger))
    }

    /// Runs a list of steps in an existing scope.
    pub fn run_in(
        &self,
        steps: &[Arc<StepNode>],
        mut scope: VariableContext,
    ) -> Result<RunReport, RunError> {
        let mut report = RunReport::default();
        info!(steps = steps.len(), "starting workflow run");
        self.run_list(steps, &mut scope, 0, &mut report)?;
        info!(
            executed = report.steps_executed,
            failures = report.failures.len(),
            unresolved = report.unresolved.len(),
            "workflow run finished"
        );
        report.scope = scope;
        Ok(report)
    }

    fn run_list(
        &self,
        steps: &[Arc<StepNode>],
        scope: &mut VariableContext,
        depth: usize,
        report: &mut RunReport,
    ) -> Result<(), RunError> {
        for step in steps {
            self.run_step(step, scope, depth, report)?;
        }
        Ok(())
    }

    fn run_step(
        &self,
        step: &StepNode,
        scope: &mut VariableContext,
        depth: usize,
        report: &mut RunReport,
    ) -> Result<(), RunError> {
        let issues: Vec<_> = validate_step(step)
            .into_iter()
            .filter(IssueKind::blocks_execution)
            .collect();
        if !issues.is_empty() {
            warn!(step_id = %step.id, issues = issues.len(), "skipping step with validation issues");
            report.record(step, depth, TraceEvent::Blocked { issues });
            return Ok(());
        }

        if !step.is_container() {
            return self.run_leaf(step, scope, depth, report);
        }

        match evaluate_step(step, scope) {
            StepEvaluation::Route(decision) => {
                report.record(
                    step,
                    depth,
                    TraceEvent::Routed {
                        path_id: decision.path_id.map(str::to_string),
                    },
                );
                let mut branch = scope.child();
                self.run_list(decision.steps, &mut branch, depth + 1, report)
            }
            StepEvaluation::Iterate(expansion) => {
                let iterations = expansion.len();
                if let Some(limit) = self.max_iterations.filter(|limit| iterations > *limit) {
                    return Err(RunError::IterationLimit {
                        step_id: step.id.clone(),
                        items: iterations,
                        limit,
                    });
                }
                report.record(step, depth, TraceEvent::Iterated { iterations });
                let body: &[Arc<StepNode>] = match &step.config {
                    StepConfig::ForEach(iterator) => &iterator.child_steps,
                    _ => &[],
                };
                for (index, mut frame) in expansion.enumerate() {
                    debug!(step_id = %step.id, index, "starting iteration");
                    report.record(step, depth, TraceEvent::Iteration { index });
                    self.run_list(body, &mut frame, depth + 1, report)?;
                }
                Ok(())
            }
            StepEvaluation::Leaf => Ok(()),
        }
    }

    fn run_leaf(
        &self,
        step: &StepNode,
        scope: &mut VariableContext,
        depth: usize,
        report: &mut RunReport,
    ) -> Result<(), RunError> {
        let (config, unresolved) = resolve_config(&step.config, scope);
        for placeholder in unresolved {
            debug!(step_id = %step.id, %placeholder, "placeholder left unresolved");
            report.unresolved.push(UnresolvedVariable {
                step_id: step.id.clone(),
                step_name: step.name.clone(),
                placeholder,
            });
        }

        let request = ActionRequest {
            step,
            config: &config,
            scope: &*scope,
        };
        let result = self.executor.execute(&request);
        match result {
            Ok(outcome) => {
                info!(step_id = %step.id, step_type = %step.step_type(), "step executed");
                report.steps_executed += 1;
                report.record(
                    step,
                    depth,
                    TraceEvent::Executed {
                        step_type: step.step_type(),
                        result_variable: outcome.result_variable.clone(),
                    },
                );
                if let Some(name) = outcome.result_variable {
                    scope.bind_result(name, outcome.value.clone());
                }
                scope.bind_scope(STEP_OUTPUT, outcome.value);
                Ok(())
            }
            Err(error) => {
                warn!(step_id = %step.id, %error, "step failed");
                report.record(
                    step,
                    depth,
                    TraceEvent::Failed {
                        message: error.message.clone(),
                    },
                );
                report.failures.push(StepFailure {
                    step_id: step.id.clone(),
                    step_name: step.name.clone(),
                    error: error.clone(),
                });
                if self.continue_on_error {
                    Ok(())
                } else {
                    Err(RunError::StepFailed {
                        step_id: step.id.clone(),
                        step_name: step.name.clone(),
                        source: error,
                    })
                }
            }
        }
    }
}

impl RunReport {
    fn record(&mut self, step: &StepNode, depth: usize, event: TraceEvent) {
        self.trace.push(TraceEntry {
            step_id: step.id.clone(),
            step_name: step.name.clone(),
            depth,
            event,
        });
    }
}
