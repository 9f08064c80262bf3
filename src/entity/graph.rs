//! Agent graphs.
//!
//! A graph owns its sub-agents, the external agents they delegate to, and the
//! registry of tools and components they reference. Every reference is an id,
//! so agents can be added in any order and may reference each other
//! cyclically; `validate` resolves the references once the graph is complete.

use super::identity::require_stable_id;
use super::models::{ModelSettings, StopWhen};
use super::registry::{EntityRegistry, ToolRef};
use super::sub_agent::{ExternalAgent, SubAgent};
use crate::error::ApiError;
use crate::types::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{btree_map, BTreeMap};

/// Settings for streamed status updates during a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_events: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status_components: Vec<Value>,
}

/// Declaration of a graph. `id` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphConfig {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_agent_id: Option<EntityId>,
    #[serde(default)]
    pub models: ModelSettings,
    #[serde(default)]
    pub stop_when: StopWhen,
    #[serde(default)]
    pub status_updates: Option<StatusUpdateSettings>,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Graph {
    id: EntityId,
    name: String,
    description: Option<String>,
    default_agent_id: Option<EntityId>,
    sub_agents: BTreeMap<EntityId, SubAgent>,
    external_agents: BTreeMap<EntityId, ExternalAgent>,
    registry: EntityRegistry,
    models: ModelSettings,
    stop_when: StopWhen,
    status_updates: Option<StatusUpdateSettings>,
    prompt: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    initialized: bool,
}

impl Graph {
    pub fn new(config: GraphConfig) -> Result<Self, ApiError> {
        let id = require_stable_id("Graph", config.id.as_deref())?;
        Ok(Self {
            id,
            name: config.name,
            description: config.description,
            default_agent_id: config.default_agent_id,
            sub_agents: BTreeMap::new(),
            external_agents: BTreeMap::new(),
            registry: EntityRegistry::new(),
            models: config.models,
            stop_when: config.stop_when,
            status_updates: config.status_updates,
            prompt: config.prompt,
            created_at: None,
            updated_at: None,
            initialized: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn default_agent_id(&self) -> Option<&str> {
        self.default_agent_id.as_deref()
    }

    pub fn models(&self) -> &ModelSettings {
        &self.models
    }

    pub fn stop_when(&self) -> &StopWhen {
        &self.stop_when
    }

    pub fn status_updates(&self) -> Option<&StatusUpdateSettings> {
        self.status_updates.as_ref()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn sub_agent(&self, id: &str) -> Option<&SubAgent> {
        self.sub_agents.get(id)
    }

    pub fn external_agent(&self, id: &str) -> Option<&ExternalAgent> {
        self.external_agents.get(id)
    }

    /// Sub-agents in id order.
    pub fn sub_agents(&self) -> impl Iterator<Item = &SubAgent> {
        self.sub_agents.values()
    }

    /// External agents in id order.
    pub fn external_agents(&self) -> impl Iterator<Item = &ExternalAgent> {
        self.external_agents.values()
    }

    pub fn add_sub_agent(&mut self, agent: SubAgent) -> Result<(), ApiError> {
        self.ensure_mutable()?;
        self.ensure_agent_id_free(agent.id())?;
        self.sub_agents.insert(agent.id().to_string(), agent);
        Ok(())
    }

    pub fn add_external_agent(&mut self, agent: ExternalAgent) -> Result<(), ApiError> {
        self.ensure_mutable()?;
        self.ensure_agent_id_free(agent.id())?;
        self.external_agents.insert(agent.id().to_string(), agent);
        Ok(())
    }

    /// Add `agent` and make it the default agent.
    pub fn with_default_agent(mut self, agent: SubAgent) -> Result<Self, ApiError> {
        let id = agent.id().to_string();
        self.add_sub_agent(agent)?;
        self.default_agent_id = Some(id);
        Ok(self)
    }

    pub fn set_default_agent_id(&mut self, id: impl Into<EntityId>) -> Result<(), ApiError> {
        self.ensure_mutable()?;
        self.default_agent_id = Some(id.into());
        Ok(())
    }

    pub fn sub_agent_mut(&mut self, id: &str) -> Result<&mut SubAgent, ApiError> {
        self.ensure_mutable()?;
        let graph_id = &self.id;
        self.sub_agents.get_mut(id).ok_or_else(|| {
            ApiError::ConfigError(format!("Graph '{}' has no sub-agent '{}'", graph_id, id))
        })
    }

    pub fn registry_mut(&mut self) -> Result<&mut EntityRegistry, ApiError> {
        self.ensure_mutable()?;
        Ok(&mut self.registry)
    }

    pub fn set_models(&mut self, models: ModelSettings) -> Result<(), ApiError> {
        self.ensure_mutable()?;
        self.models = models;
        Ok(())
    }

    pub fn set_stop_when(&mut self, stop_when: StopWhen) -> Result<(), ApiError> {
        self.ensure_mutable()?;
        self.stop_when = stop_when;
        Ok(())
    }

    /// Check every invariant that spans more than one entity.
    pub fn validate(&self) -> Result<(), ApiError> {
        let default_id = self.default_agent_id.as_deref().ok_or_else(|| {
            ApiError::ConfigError(format!("Graph '{}' has no default agent", self.id))
        })?;
        if !self.sub_agents.contains_key(default_id) {
            return Err(ApiError::ConfigError(format!(
                "Default agent '{}' is not a sub-agent of graph '{}'",
                default_id, self.id
            )));
        }

        for agent in self.sub_agents.values() {
            self.validate_agent_references(agent)?;
        }
        Ok(())
    }

    fn validate_agent_references(&self, agent: &SubAgent) -> Result<(), ApiError> {
        for target in &agent.can_transfer_to {
            if self.external_agents.contains_key(target) {
                return Err(ApiError::ConfigError(format!(
                    "Agent '{}' cannot transfer to external agent '{}'; external agents are delegate-only",
                    agent.id(),
                    target
                )));
            }
            if !self.sub_agents.contains_key(target) {
                return Err(ApiError::ConfigError(format!(
                    "Agent '{}' transfers to unknown agent '{}' in graph '{}'",
                    agent.id(),
                    target,
                    self.id
                )));
            }
        }

        for target in &agent.can_delegate_to {
            if !self.sub_agents.contains_key(target) && !self.external_agents.contains_key(target)
            {
                return Err(ApiError::ConfigError(format!(
                    "Agent '{}' delegates to unknown agent '{}' in graph '{}'",
                    agent.id(),
                    target,
                    self.id
                )));
            }
        }

        for tool_use in &agent.can_use {
            let tool = self.registry.tool_or_error(&tool_use.tool_id)?;
            if let (ToolRef::Mcp(tool), Some(selection)) = (tool, &tool_use.tool_selection) {
                if let Some(active) = &tool.active_tools {
                    if let Some(unknown) = selection.iter().find(|name| !active.contains(name)) {
                        return Err(ApiError::ConfigError(format!(
                            "Agent '{}' selects '{}' which tool '{}' does not expose",
                            agent.id(),
                            unknown,
                            tool.id()
                        )));
                    }
                }
            }
        }

        for id in &agent.data_components {
            if self.registry.data_component(id).is_none() {
                return Err(ApiError::ConfigError(format!(
                    "Agent '{}' references unknown data component '{}'",
                    agent.id(),
                    id
                )));
            }
        }
        for id in &agent.artifact_components {
            if self.registry.artifact_component(id).is_none() {
                return Err(ApiError::ConfigError(format!(
                    "Agent '{}' references unknown artifact component '{}'",
                    agent.id(),
                    id
                )));
            }
        }
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<(), ApiError> {
        if self.initialized {
            return Err(ApiError::ConfigError(format!(
                "Graph '{}' is already initialized; configuration is frozen",
                self.id
            )));
        }
        Ok(())
    }

    fn ensure_agent_id_free(&self, id: &str) -> Result<(), ApiError> {
        if self.sub_agents.contains_key(id) || self.external_agents.contains_key(id) {
            return Err(ApiError::ConfigError(format!(
                "Agent id '{}' is already used in graph '{}'",
                id, self.id
            )));
        }
        Ok(())
    }

    // Resolution and synchronization write effective state through these,
    // bypassing the frozen-configuration gate.

    pub(crate) fn effective_parts_mut(
        &mut self,
    ) -> (
        &mut ModelSettings,
        &mut StopWhen,
        btree_map::ValuesMut<'_, EntityId, SubAgent>,
    ) {
        (
            &mut self.models,
            &mut self.stop_when,
            self.sub_agents.values_mut(),
        )
    }

    pub(crate) fn record_timestamps(
        &mut self,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) {
        if created_at.is_some() {
            self.created_at = created_at;
        }
        if updated_at.is_some() {
            self.updated_at = updated_at;
        }
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
    }
}
