use super::container::{ConditionalPathsConfig, ForEachConfig};
use crate::definition::validation::IssueKind;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Behaviour shared by every step config shape.
///
/// Defaults describe a config with no required fields, no templated text and no
/// result variable, so each shape only overrides what it actually has.
pub trait StepKind {
    /// Appends local validation issues for this config.
    fn check(&self, _issues: &mut Vec<IssueKind>) {}

    /// Visits every string field that may contain `{{...}}` or `{name}` placeholders.
    fn visit_templates_mut(&mut self, _visit: &mut dyn FnMut(&mut String)) {}

    /// The variable name this step declares for its result, if any.
    fn result_variable(&self) -> Option<&str> {
        None
    }
}

fn require(value: &str, field: &'static str, issues: &mut Vec<IssueKind>) {
    if value.trim().is_empty() {
        issues.push(IssueKind::MissingField { field });
    }
}

/// Declares the closed set of step types, their wire names and their config shapes.
///
/// Adding a step type means adding one row here plus its config struct.
macro_rules! define_step_types {
    (@container leaf) => { false };
    (@container container) => { true };
    ( $( ($variant:ident, $type_name:literal, $config:ty, $kind:ident) ),* $(,)? ) => {
        /// The `type` discriminant of a step node.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum StepType {
            $( $variant, )*
        }

        impl StepType {
            pub const ALL: &'static [StepType] = &[ $( StepType::$variant, )* ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( StepType::$variant => $type_name, )*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $type_name => Some(StepType::$variant), )*
                    _ => None,
                }
            }

            pub fn is_container(&self) -> bool {
                match self {
                    $( StepType::$variant => define_step_types!(@container $kind), )*
                }
            }
        }

        /// Type-specific configuration of a step. The variant is the step's type.
        #[derive(Debug, Clone, PartialEq)]
        pub enum StepConfig {
            $( $variant($config), )*
        }

        impl StepConfig {
            pub fn step_type(&self) -> StepType {
                match self {
                    $( StepConfig::$variant(_) => StepType::$variant, )*
                }
            }

            /// The empty config for a type. Used when a node's type changes.
            pub fn empty(step_type: StepType) -> Self {
                match step_type {
                    $( StepType::$variant => StepConfig::$variant(<$config>::default()), )*
                }
            }

            pub(crate) fn from_value(
                step_type: StepType,
                value: serde_json::Value,
            ) -> Result<Self, serde_json::Error> {
                match step_type {
                    $( StepType::$variant => serde_json::from_value::<$config>(value).map(StepConfig::$variant), )*
                }
            }

            fn kind(&self) -> &dyn StepKind {
                match self {
                    $( StepConfig::$variant(config) => config, )*
                }
            }

            fn kind_mut(&mut self) -> &mut dyn StepKind {
                match self {
                    $( StepConfig::$variant(config) => config, )*
                }
            }
        }

        impl Serialize for StepConfig {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self {
                    $( StepConfig::$variant(config) => config.serialize(serializer), )*
                }
            }
        }
    };
}

define_step_types! {
    (IntegrationAction, "integration_action", IntegrationActionConfig, leaf),
    (StrategyUpdate, "strategy_update", StrategyUpdateConfig, leaf),
    (DataSourceQuery, "data_source_query", DataSourceQueryConfig, leaf),
    (PlatformQuery, "platform_query", PlatformQueryConfig, leaf),
    (DataTransformation, "data_transformation", DataTransformationConfig, leaf),
    (LogEvent, "log_event", LogEventConfig, leaf),
    (Notification, "notification", NotificationConfig, leaf),
    (CreateWorkItem, "create_work_item", CreateWorkItemConfig, leaf),
    (AiDraftResponse, "ai_draft_response", AiDraftResponseConfig, leaf),
    (SendTicketMessage, "send_ticket_message", SendTicketMessageConfig, leaf),
    (ForEach, "for_each", ForEachConfig, container),
    (ConditionalPaths, "conditional_paths", ConditionalPathsConfig, container),
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StepConfig {
    pub fn check(&self, issues: &mut Vec<IssueKind>) {
        self.kind().check(issues)
    }

    pub fn visit_templates_mut(&mut self, visit: &mut dyn FnMut(&mut String)) {
        self.kind_mut().visit_templates_mut(visit)
    }

    pub fn result_variable(&self) -> Option<&str> {
        self.kind().result_variable()
    }
}

/// Config keys this crate does not interpret, kept verbatim through load and save.
pub type ExtraFields = serde_json::Map<String, serde_json::Value>;

/// Visits every string inside a JSON value, at any depth.
fn visit_json_strings(value: &mut serde_json::Value, visit: &mut dyn FnMut(&mut String)) {
    match value {
        serde_json::Value::String(text) => visit(text),
        serde_json::Value::Array(items) => {
            for item in items {
                visit_json_strings(item, visit);
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values_mut() {
                visit_json_strings(item, visit);
            }
        }
        _ => {}
    }
}

// --- Leaf configs ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntegrationActionConfig {
    pub integration: String,
    pub action: String,
    pub params: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_variable: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl StepKind for IntegrationActionConfig {
    fn check(&self, issues: &mut Vec<IssueKind>) {
        require(&self.integration, "integration", issues);
        require(&self.action, "action", issues);
    }

    fn visit_templates_mut(&mut self, visit: &mut dyn FnMut(&mut String)) {
        for value in self.params.values_mut() {
            visit_json_strings(value, visit);
        }
    }

    fn result_variable(&self) -> Option<&str> {
        self.result_variable.as_deref()
    }
}

/// What a `strategy_update` step writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyTarget {
    #[default]
    KeyResult,
    Objective,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StrategyUpdateConfig {
    /// Always present after loading; documents missing it are repaired to `key_result`.
    #[serde(rename = "type")]
    pub target: StrategyTarget,
    pub target_id: String,
    pub field: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_variable: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl StepKind for StrategyUpdateConfig {
    fn check(&self, issues: &mut Vec<IssueKind>) {
        require(&self.target_id, "targetId", issues);
    }

    fn visit_templates_mut(&mut self, visit: &mut dyn FnMut(&mut String)) {
        visit(&mut self.target_id);
        visit(&mut self.value);
    }

    fn result_variable(&self) -> Option<&str> {
        self.result_variable.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataSourceQueryConfig {
    pub data_source_id: String,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_variable: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl StepKind for DataSourceQueryConfig {
    fn check(&self, issues: &mut Vec<IssueKind>) {
        require(&self.data_source_id, "dataSourceId", issues);
    }

    fn visit_templates_mut(&mut self, visit: &mut dyn FnMut(&mut String)) {
        visit(&mut self.query);
    }

    fn result_variable(&self) -> Option<&str> {
        self.result_variable.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlatformQueryConfig {
    pub entity: String,
    pub filters: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_variable: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl StepKind for PlatformQueryConfig {
    fn check(&self, issues: &mut Vec<IssueKind>) {
        require(&self.entity, "entity", issues);
    }

    fn visit_templates_mut(&mut self, visit: &mut dyn FnMut(&mut String)) {
        for value in self.filters.values_mut() {
            visit_json_strings(value, visit);
        }
    }

    fn result_variable(&self) -> Option<&str> {
        self.result_variable.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataTransformationConfig {
    pub input: String,
    pub expression: String,
    /// JSON object text with extra variables for the transformation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_variables: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_variable: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl DataTransformationConfig {
    /// Parses `custom_variables`. Blank text counts as no variables.
    pub fn parsed_custom_variables(
        &self,
    ) -> Result<serde_json::Map<String, serde_json::Value>, String> {
        let Some(text) = self.custom_variables.as_deref() else {
            return Ok(serde_json::Map::new());
        };
        if text.trim().is_empty() {
            return Ok(serde_json::Map::new());
        }
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(other) => Err(format!("expected a JSON object, found {}", json_kind(&other))),
            Err(e) => Err(e.to_string()),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl StepKind for DataTransformationConfig {
    fn check(&self, issues: &mut Vec<IssueKind>) {
        if let Err(message) = self.parsed_custom_variables() {
            issues.push(IssueKind::MalformedCustomVariables { message });
        }
    }

    fn visit_templates_mut(&mut self, visit: &mut dyn FnMut(&mut String)) {
        visit(&mut self.input);
        visit(&mut self.expression);
    }

    fn result_variable(&self) -> Option<&str> {
        self.result_variable.as_deref()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    #[default]
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEventConfig {
    pub level: LogLevel,
    pub message: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl StepKind for LogEventConfig {
    fn visit_templates_mut(&mut self, visit: &mut dyn FnMut(&mut String)) {
        visit(&mut self.message);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub channel: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub message: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl StepKind for NotificationConfig {
    fn check(&self, issues: &mut Vec<IssueKind>) {
        require(&self.channel, "channel", issues);
    }

    fn visit_templates_mut(&mut self, visit: &mut dyn FnMut(&mut String)) {
        self.recipients.iter_mut().for_each(&mut *visit);
        visit(&mut self.subject);
        visit(&mut self.message);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateWorkItemConfig {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_variable: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl StepKind for CreateWorkItemConfig {
    fn check(&self, issues: &mut Vec<IssueKind>) {
        require(&self.title, "title", issues);
    }

    fn visit_templates_mut(&mut self, visit: &mut dyn FnMut(&mut String)) {
        visit(&mut self.title);
        visit(&mut self.description);
        if let Some(assignee) = self.assignee.as_mut() {
            visit(assignee);
        }
    }

    fn result_variable(&self) -> Option<&str> {
        self.result_variable.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiDraftResponseConfig {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_variable: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl StepKind for AiDraftResponseConfig {
    fn check(&self, issues: &mut Vec<IssueKind>) {
        require(&self.prompt, "prompt", issues);
    }

    fn visit_templates_mut(&mut self, visit: &mut dyn FnMut(&mut String)) {
        visit(&mut self.prompt);
        if let Some(context) = self.context.as_mut() {
            visit(context);
        }
    }

    fn result_variable(&self) -> Option<&str> {
        self.result_variable.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SendTicketMessageConfig {
    pub ticket_id: String,
    pub message: String,
    pub internal: bool,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl StepKind for SendTicketMessageConfig {
    fn check(&self, issues: &mut Vec<IssueKind>) {
        require(&self.ticket_id, "ticketId", issues);
    }

    fn visit_templates_mut(&mut self, visit: &mut dyn FnMut(&mut String)) {
        visit(&mut self.ticket_id);
        visit(&mut self.message);
    }
}
