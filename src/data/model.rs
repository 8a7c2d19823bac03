use crate::error::DefinitionError;
use crate::scope::VariableContext;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fs;
use std::path::Path;

/// The event payload a workflow run starts from, bound as the `trigger` scope.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct TriggerPayload(pub Value);

impl TriggerPayload {
    /// Load a trigger payload from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self(serde_json::from_str(&content)?))
    }

    /// A small ticket-shaped payload used when no file is provided.
    pub fn sample() -> Self {
        Self(json!({
            "ticketId": "T-1001",
            "category": "support",
            "priority": "3",
            "subject": "Cannot export report",
            "customer": { "name": "Acme", "tier": "enterprise" },
            "items": []
        }))
    }

    /// A root scope with this payload bound as `trigger`.
    pub fn into_scope(self) -> VariableContext {
        VariableContext::with_trigger(self.0)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

impl Default for TriggerPayload {
    fn default() -> Self {
        Self(Value::Object(Default::default()))
    }
}
