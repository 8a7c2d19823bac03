//! Common test utilities for building workflow trees, scopes and executors.
use keiro::prelude::*;
use keiro::step::{LogEventConfig, NotificationConfig, StepList, StrategyUpdateConfig};
use serde_json::Value;
use std::cell::RefCell;
use std::sync::Arc;

/// A router on `trigger.category` with one `support` path and a non-empty default path.
#[allow(dead_code)]
pub const SUPPORT_ROUTER_JSON: &str = r#"[
  {
    "id": "route-category",
    "type": "conditional_paths",
    "name": "Route by category",
    "config": {
      "conditions": [
        {
          "id": "support",
          "conditions": [
            { "field": "trigger.category", "operator": "equals", "value": "support" }
          ],
          "pathSteps": [
            {
              "id": "draft-reply",
              "type": "ai_draft_response",
              "name": "Draft reply",
              "config": { "prompt": "Reply to {{trigger.subject}}", "resultVariable": "draft" }
            }
          ]
        }
      ],
      "defaultPath": {
        "steps": [
          {
            "id": "log-other",
            "type": "log_event",
            "name": "Log other category",
            "config": { "level": "info", "message": "Unhandled category {{trigger.category}}" }
          }
        ]
      }
    }
  }
]"#;

/// A `for_each` over `trigger.accounts` that creates one work item per account.
#[allow(dead_code)]
pub const FOLLOW_UP_JSON: &str = r#"[
  {
    "id": "each-account",
    "type": "for_each",
    "name": "Each account",
    "config": {
      "sourceVariable": "{{trigger.accounts}}",
      "childSteps": [
        {
          "id": "follow-up",
          "type": "create_work_item",
          "name": "Create follow-up",
          "config": { "title": "Follow up: {{currentItem.name}}", "resultVariable": "workItem" }
        }
      ]
    }
  }
]"#;

/// A legacy document: the `strategy_update` step has no target type.
#[allow(dead_code)]
pub const LEGACY_STRATEGY_JSON: &str = r#"[
  {
    "id": "bump-kr",
    "type": "strategy_update",
    "name": "Bump key result",
    "config": { "targetId": "kr-7", "field": "progress", "value": "{{trigger.progress}}" }
  }
]"#;

#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)]
pub fn condition(field: &str, operator: Operator, value: &str) -> Condition {
    Condition::new(field, operator, value)
}

#[allow(dead_code)]
pub fn list(steps: Vec<StepNode>) -> StepList {
    steps.into_iter().map(Arc::new).collect()
}

/// A log step whose message is a template.
#[allow(dead_code)]
pub fn log_step(id: &str, message: &str) -> StepNode {
    StepNode::new(
        id,
        format!("Log {}", id),
        StepConfig::LogEvent(LogEventConfig {
            message: message.to_string(),
            ..Default::default()
        }),
    )
}

#[allow(dead_code)]
pub fn notification(id: &str, subject: &str) -> StepNode {
    StepNode::new(
        id,
        format!("Notify {}", id),
        StepConfig::Notification(NotificationConfig {
            channel: "email".to_string(),
            subject: subject.to_string(),
            ..Default::default()
        }),
    )
}

#[allow(dead_code)]
pub fn strategy_update(id: &str, value: &str, result_variable: Option<&str>) -> StepNode {
    StepNode::new(
        id,
        format!("Update {}", id),
        StepConfig::StrategyUpdate(StrategyUpdateConfig {
            target_id: "kr-1".to_string(),
            field: "progress".to_string(),
            value: value.to_string(),
            result_variable: result_variable.map(str::to_string),
            ..Default::default()
        }),
    )
}

#[allow(dead_code)]
pub fn router(id: &str, paths: Vec<ConditionPath>, default_steps: Vec<StepNode>) -> StepNode {
    StepNode::new(
        id,
        format!("Route {}", id),
        StepConfig::ConditionalPaths(ConditionalPathsConfig {
            conditions: paths,
            default_path: DefaultPath {
                steps: list(default_steps),
            },
        }),
    )
}

#[allow(dead_code)]
pub fn path(id: &str, conditions: Vec<Condition>, steps: Vec<StepNode>) -> ConditionPath {
    ConditionPath::new(id, conditions, list(steps))
}

#[allow(dead_code)]
pub fn for_each(id: &str, source: &str, children: Vec<StepNode>) -> StepNode {
    StepNode::new(
        id,
        format!("Each {}", id),
        StepConfig::ForEach(ForEachConfig {
            source_variable: source.to_string(),
            child_steps: list(children),
        }),
    )
}

/// One call an executor received.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Dispatched {
    pub step_id: String,
    pub config: Value,
    pub current_item: Option<Value>,
}

/// Records every request and echoes the resolved config like `DryRunExecutor`.
/// Steps listed in `failing` report an error instead.
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingExecutor {
    pub calls: RefCell<Vec<Dispatched>>,
    pub failing: Vec<String>,
}

#[allow(dead_code)]
impl RecordingExecutor {
    pub fn failing_on(ids: &[&str]) -> Self {
        Self {
            calls: RefCell::default(),
            failing: ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub fn step_ids(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.step_id.clone()).collect()
    }

    pub fn calls(&self) -> Vec<Dispatched> {
        self.calls.borrow().clone()
    }
}

impl ActionExecutor for RecordingExecutor {
    fn execute(&self, request: &ActionRequest<'_>) -> Result<ActionOutcome, ActionError> {
        let config = serde_json::to_value(request.config).map_err(|e| ActionError::new(e.to_string()))?;
        self.calls.borrow_mut().push(Dispatched {
            step_id: request.step_id().to_string(),
            config: config.clone(),
            current_item: request.scope.get("currentItem").cloned(),
        });
        if self.failing.iter().any(|id| id == request.step_id()) {
            return Err(ActionError::new(format!("{} is unavailable", request.step_id())));
        }
        Ok(ActionOutcome::for_config(request.config, config))
    }
}
