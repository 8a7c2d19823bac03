//! # Keiro - Workflow Step Model and Evaluator
//!
//! **Keiro** models automation workflows as ordered trees of typed steps and
//! evaluates their control flow. Leaf steps describe side effects (integration
//! calls, queries, notifications) that Keiro never performs itself: it resolves
//! their templates and hands them to an [`dispatch::ActionExecutor`].
//!
//! ## Core Workflow
//!
//! 1.  **Load**: Parse a workflow document with `WorkflowDefinition::from_json` or `from_file`.
//!     Unknown step types are rejected, and legacy `strategy_update` steps are repaired.
//! 2.  **Edit**: Use the copy-on-write operations (`append_step`, `remove_step`,
//!     `change_step_type`, ...). Each returns a new definition and leaves the old one intact.
//! 3.  **Validate**: `validate` lists every structural issue in the tree.
//! 4.  **Run**: A `Runner` walks the tree, routes `conditional_paths` steps, expands
//!     `for_each` steps, and dispatches every leaf to your executor.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keiro::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> BoxResult<()> {
//!     let definition = WorkflowDefinition::from_json(
//!         r#"[
//!           {"id": "route", "type": "conditional_paths", "name": "By category", "config": {
//!             "conditions": [{
//!               "id": "sales",
//!               "conditions": [{"field": "trigger.category", "operator": "equals", "value": "sales"}],
//!               "pathSteps": [{"id": "notify", "type": "notification", "name": "Notify sales",
//!                              "config": {"channel": "email", "subject": "New lead {{trigger.id}}"}}]
//!             }],
//!             "defaultPath": {"steps": []}
//!           }}
//!         ]"#,
//!     )?;
//!
//!     let report = validate(&definition);
//!     for issue in &report.issues {
//!         println!("{}", issue);
//!     }
//!
//!     let runner = Runner::builder(DryRunExecutor).max_iterations(1000).build();
//!     let run = runner.run(&definition, json!({"category": "sales", "id": 7}))?;
//!     println!("{}", TraceFormatter::format_trace(&run.trace));
//!
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod definition;
pub mod dispatch;
pub mod error;
pub mod evaluator;
pub mod prelude;
pub mod runner;
pub mod scope;
pub mod step;
pub mod trace;
