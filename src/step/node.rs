use super::config::{StepConfig, StepType, StrategyUpdateConfig};
use crate::error::DefinitionError;
use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;
use tracing::debug;

/// An ordered list of sibling steps. Nodes are shared between tree versions.
pub type StepList = Vec<Arc<StepNode>>;

/// One unit of a workflow tree.
///
/// The step's type is the variant of its config, so a node can never carry a
/// config shape that disagrees with its type.
#[derive(Debug, Clone, PartialEq)]
pub struct StepNode {
    pub id: String,
    pub name: String,
    pub config: StepConfig,
}

impl StepNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, config: StepConfig) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            config,
        }
    }

    pub fn step_type(&self) -> StepType {
        self.config.step_type()
    }

    pub fn is_container(&self) -> bool {
        self.step_type().is_container()
    }

    /// Child step lists in document order: a router's paths, then its default path.
    pub fn child_lists(&self) -> Vec<&StepList> {
        match &self.config {
            StepConfig::ForEach(config) => vec![&config.child_steps],
            StepConfig::ConditionalPaths(config) => config
                .conditions
                .iter()
                .map(|path| &path.path_steps)
                .chain(std::iter::once(&config.default_path.steps))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn child_lists_mut(&mut self) -> Vec<&mut StepList> {
        match &mut self.config {
            StepConfig::ForEach(config) => vec![&mut config.child_steps],
            StepConfig::ConditionalPaths(config) => config
                .conditions
                .iter_mut()
                .map(|path| &mut path.path_steps)
                .chain(std::iter::once(&mut config.default_path.steps))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns a copy of this node with a different type. The old config is dropped.
    pub fn with_type(&self, step_type: StepType) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            config: StepConfig::empty(step_type),
        }
    }

    /// Builds a node from its document form, applying load-time repairs.
    pub(crate) fn from_raw(raw: RawStep) -> Result<Self, DefinitionError> {
        let step_type =
            StepType::from_name(&raw.step_type).ok_or_else(|| DefinitionError::UnknownStepType {
                step_id: raw.id.clone(),
                type_name: raw.step_type.clone(),
            })?;

        let mut config = match raw.config {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other,
        };
        if step_type == StepType::StrategyUpdate {
            repair_strategy_target(&raw.id, &mut config);
        }

        let config = StepConfig::from_value(step_type, config).map_err(|e| {
            DefinitionError::InvalidConfig {
                step_id: raw.id.clone(),
                type_name: raw.step_type.clone(),
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            id: raw.id,
            name: raw.name,
            config,
        })
    }
}

/// Older documents saved `strategy_update` steps without a target type.
/// They are treated as key-result updates, never rejected.
fn repair_strategy_target(step_id: &str, config: &mut serde_json::Value) {
    if let serde_json::Value::Object(map) = config {
        let missing = map.get("type").is_none_or(|t| t.is_null());
        if missing {
            debug!(step_id, "repairing strategy_update step without a target type");
            map.insert(
                "type".to_string(),
                serde_json::to_value(StrategyUpdateConfig::default().target)
                    .unwrap_or_else(|_| serde_json::Value::String("key_result".to_string())),
            );
        }
    }
}

/// The document form of a step, before its config is interpreted.
#[derive(Debug, Deserialize)]
pub(crate) struct RawStep {
    pub id: String,
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

impl Serialize for StepNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("StepNode", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("type", self.step_type().as_str())?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("config", &self.config)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for StepNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawStep::deserialize(deserializer)?;
        StepNode::from_raw(raw).map_err(D::Error::custom)
    }
}
