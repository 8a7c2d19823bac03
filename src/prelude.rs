//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the keiro crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use keiro::prelude::*;
//!
//! # fn run_example() -> BoxResult<()> {
//! let definition = WorkflowDefinition::from_file("path/to/workflow.json")?;
//! let trigger = TriggerPayload::from_file("path/to/trigger.json")?;
//!
//! let runner = Runner::new(DryRunExecutor);
//! let report = runner.run(&definition, trigger.0)?;
//! println!("{}", TraceFormatter::format_trace(&report.trace));
//! # Ok(())
//! # }
//! ```

// Document model
pub use crate::definition::{
    StepSlot, ValidationIssue, ValidationReport, WorkflowDefinition, validate,
};
pub use crate::step::{
    Condition, ConditionPath, ConditionalPathsConfig, DefaultPath, ForEachConfig, Operator,
    StepConfig, StepNode, StepType,
};

// Scopes and evaluation
pub use crate::evaluator::{evaluate, route};
pub use crate::scope::{VariableContext, render};

// Execution
pub use crate::dispatch::{ActionExecutor, ActionOutcome, ActionRequest, DryRunExecutor};
pub use crate::runner::{RunReport, Runner};

// Data structures
pub use crate::data::TriggerPayload;

// Error types
pub use crate::error::{ActionError, DefinitionError, EditError, RunError};

// Trace formatting
pub use crate::trace::TraceFormatter;

// Result alias for applications. Named so the glob import keeps `Result` intact.
pub type BoxResult<T> = Result<T, Box<dyn std::error::Error>>;
