//! Full Graph Definition and the per-entity definitions it embeds.

use crate::entity::{ModelSettings, StatusUpdateSettings, StopWhen, TransportKind};
use crate::types::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Canonical synchronization document for one graph.
///
/// Every collection is keyed by id in a `BTreeMap` so serialization order is
/// stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullGraphDefinition {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_agent_id: Option<EntityId>,
    pub agents: BTreeMap<EntityId, AgentDefinition>,
    #[serde(default)]
    pub tools: BTreeMap<EntityId, ToolDefinition>,
    #[serde(default)]
    pub functions: BTreeMap<EntityId, FunctionDefinition>,
    #[serde(default)]
    pub function_tools: BTreeMap<EntityId, FunctionToolDefinition>,
    #[serde(default)]
    pub data_components: BTreeMap<EntityId, DataComponentDefinition>,
    #[serde(default)]
    pub artifact_components: BTreeMap<EntityId, ArtifactComponentDefinition>,
    #[serde(default)]
    pub credential_references: BTreeMap<EntityId, CredentialReferenceDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_when: Option<StopWhen>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_updates: Option<StatusUpdateSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// An entry of the `agents` collection, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AgentDefinition {
    Internal(InternalAgentDefinition),
    External(ExternalAgentDefinition),
}

impl AgentDefinition {
    pub fn id(&self) -> &str {
        match self {
            AgentDefinition::Internal(agent) => &agent.id,
            AgentDefinition::External(agent) => &agent.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalAgentDefinition {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_when: Option<StopWhen>,
    #[serde(default)]
    pub can_transfer_to: Vec<EntityId>,
    #[serde(default)]
    pub can_delegate_to: Vec<EntityId>,
    #[serde(default)]
    pub can_use: Vec<CanUseDefinition>,
    #[serde(default)]
    pub data_components: Vec<EntityId>,
    #[serde(default)]
    pub artifact_components: Vec<EntityId>,
}

/// One tool usage of an internal agent. Absent selections and headers are
/// serialized as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanUseDefinition {
    pub tool_id: EntityId,
    #[serde(default)]
    pub tool_selection: Option<Vec<String>>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalAgentDefinition {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub base_url: String,
    #[serde(default)]
    pub credential_reference_id: Option<EntityId>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub config: ToolServerConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_reference_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// `{ "type": "mcp", "mcp": { ... } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolServerConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub mcp: McpServerDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServerDefinition {
    pub server: McpServerUrl,
    pub transport: McpTransport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_tools: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpServerUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpTransport {
    #[serde(rename = "type")]
    pub kind: TransportKind,
}

/// Hoisted executable body of a function tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    pub id: EntityId,
    pub input_schema: Value,
    pub execute_code: String,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionToolDefinition {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub function_id: EntityId,
    pub graph_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataComponentDefinition {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub props: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactComponentDefinition {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub summary_props: Value,
    #[serde(default)]
    pub full_props: Value,
}

/// A referenced credential. Only `id` is known when the credential was not
/// registered locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialReferenceDefinition {
    pub id: EntityId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_store_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_params: Option<Value>,
}
