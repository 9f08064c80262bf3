//! Data components, artifact components and credential references.

use super::identity::{derive_id, require_stable_id};
use crate::error::ApiError;
use crate::types::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declaration of a data component. The id is derived from the name when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataComponentConfig {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub props: Value,
}

/// Structured output shape an agent may emit.
#[derive(Debug, Clone, PartialEq)]
pub struct DataComponent {
    id: EntityId,
    pub name: String,
    pub description: String,
    pub props: Value,
}

impl DataComponent {
    pub fn new(config: DataComponentConfig) -> Result<Self, ApiError> {
        let id = derive_id("DataComponent", config.id.as_deref(), &config.name)?;
        Ok(Self {
            id,
            name: config.name,
            description: config.description,
            props: config.props,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Declaration of an artifact component. The id is derived from the name when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactComponentConfig {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub summary_props: Value,
    #[serde(default)]
    pub full_props: Value,
}

/// Artifact shape with a summary and a full variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactComponent {
    id: EntityId,
    pub name: String,
    pub description: String,
    pub summary_props: Value,
    pub full_props: Value,
}

impl ArtifactComponent {
    pub fn new(config: ArtifactComponentConfig) -> Result<Self, ApiError> {
        let id = derive_id("ArtifactComponent", config.id.as_deref(), &config.name)?;
        Ok(Self {
            id,
            name: config.name,
            description: config.description,
            summary_props: config.summary_props,
            full_props: config.full_props,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Pointer to a secret held by a credential store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialReference {
    id: EntityId,
    #[serde(rename = "type")]
    pub kind: String,
    pub credential_store_id: String,
    #[serde(default)]
    pub retrieval_params: Value,
}

impl CredentialReference {
    pub fn new(
        id: Option<&str>,
        kind: impl Into<String>,
        credential_store_id: impl Into<String>,
        retrieval_params: Value,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            id: require_stable_id("CredentialReference", id)?,
            kind: kind.into(),
            credential_store_id: credential_store_id.into(),
            retrieval_params,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}
