//! Full Project Definition.

use super::graph::{
    ArtifactComponentDefinition, CredentialReferenceDefinition, DataComponentDefinition,
    FullGraphDefinition, FunctionDefinition, ToolDefinition,
};
use crate::entity::{ModelSettings, StopWhen};
use crate::types::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Project metadata without graphs, upserted before any graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_when: Option<StopWhen>,
}

/// Canonical synchronization document for a project: its metadata, every
/// graph, and a registry of tools and components deduplicated across all
/// graphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullProjectDefinition {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_when: Option<StopWhen>,
    pub graphs: BTreeMap<EntityId, FullGraphDefinition>,
    #[serde(default)]
    pub tools: BTreeMap<EntityId, ToolDefinition>,
    #[serde(default)]
    pub functions: BTreeMap<EntityId, FunctionDefinition>,
    #[serde(default)]
    pub data_components: BTreeMap<EntityId, DataComponentDefinition>,
    #[serde(default)]
    pub artifact_components: BTreeMap<EntityId, ArtifactComponentDefinition>,
    #[serde(default)]
    pub credential_references: BTreeMap<EntityId, CredentialReferenceDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl FullProjectDefinition {
    pub fn metadata(&self) -> ProjectMetadata {
        ProjectMetadata {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            models: self.models.clone(),
            stop_when: self.stop_when,
        }
    }
}
