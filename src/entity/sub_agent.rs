//! Internal sub-agents and external agents.

use super::identity::require_stable_id;
use super::models::{ModelSettings, StopWhen};
use crate::error::ApiError;
use crate::types::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A sub-agent's use of a tool, optionally narrowed to a subset of the tool's
/// functions and carrying per-agent headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUse {
    pub tool_id: EntityId,

    #[serde(default)]
    pub tool_selection: Option<Vec<String>>,

    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
}

impl ToolUse {
    pub fn new(tool_id: impl Into<EntityId>) -> Self {
        Self {
            tool_id: tool_id.into(),
            tool_selection: None,
            headers: None,
        }
    }

    pub fn with_selection<I, S>(mut self, selection: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tool_selection = Some(selection.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }
}

/// Declaration of an internal sub-agent. `id` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAgentConfig {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub models: ModelSettings,
    #[serde(default)]
    pub stop_when: StopWhen,
    #[serde(default)]
    pub can_use: Vec<ToolUse>,
    #[serde(default)]
    pub data_components: Vec<EntityId>,
    #[serde(default)]
    pub artifact_components: Vec<EntityId>,
    #[serde(default)]
    pub can_transfer_to: Vec<EntityId>,
    #[serde(default)]
    pub can_delegate_to: Vec<EntityId>,
}

/// Internally hosted agent. References to tools, components and other agents
/// are ids resolved against the owning graph, so agents may reference each
/// other in any order and in cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct SubAgent {
    id: EntityId,
    pub name: String,
    pub description: String,
    pub prompt: String,
    pub models: ModelSettings,
    pub stop_when: StopWhen,
    pub can_use: Vec<ToolUse>,
    pub data_components: Vec<EntityId>,
    pub artifact_components: Vec<EntityId>,
    pub can_transfer_to: Vec<EntityId>,
    pub can_delegate_to: Vec<EntityId>,
}

impl SubAgent {
    pub fn new(config: SubAgentConfig) -> Result<Self, ApiError> {
        let id = require_stable_id("SubAgent", config.id.as_deref())?;
        if config.name.trim().is_empty() {
            return Err(ApiError::ConfigError(format!(
                "SubAgent '{}' requires a name",
                id
            )));
        }
        Ok(Self {
            id,
            name: config.name,
            description: config.description,
            prompt: config.prompt,
            models: config.models,
            stop_when: config.stop_when,
            can_use: config.can_use,
            data_components: config.data_components,
            artifact_components: config.artifact_components,
            can_transfer_to: config.can_transfer_to,
            can_delegate_to: config.can_delegate_to,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn transfers_to(mut self, target: impl Into<EntityId>) -> Self {
        self.can_transfer_to.push(target.into());
        self
    }

    pub fn delegates_to(mut self, target: impl Into<EntityId>) -> Self {
        self.can_delegate_to.push(target.into());
        self
    }

    pub fn uses(mut self, tool: ToolUse) -> Self {
        self.can_use.push(tool);
        self
    }

    pub fn with_data_component(mut self, id: impl Into<EntityId>) -> Self {
        self.data_components.push(id.into());
        self
    }

    pub fn with_artifact_component(mut self, id: impl Into<EntityId>) -> Self {
        self.artifact_components.push(id.into());
        self
    }
}

/// Declaration of an external agent. `id` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalAgentConfig {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_url: String,
    #[serde(default)]
    pub credential_reference_id: Option<EntityId>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
}

/// Agent hosted by a third party. Reachable only as a delegate target.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalAgent {
    id: EntityId,
    pub name: String,
    pub description: String,
    pub base_url: String,
    pub credential_reference_id: Option<EntityId>,
    pub headers: Option<BTreeMap<String, String>>,
}

impl ExternalAgent {
    pub fn new(config: ExternalAgentConfig) -> Result<Self, ApiError> {
        let id = require_stable_id("ExternalAgent", config.id.as_deref())?;
        if config.base_url.trim().is_empty() {
            return Err(ApiError::ConfigError(format!(
                "ExternalAgent '{}' requires a base URL",
                id
            )));
        }
        Ok(Self {
            id,
            name: config.name,
            description: config.description,
            base_url: config.base_url,
            credential_reference_id: config.credential_reference_id,
            headers: config.headers,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}
