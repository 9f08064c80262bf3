//! MCP tools and function tools.

use super::identity::derive_id;
use crate::error::ApiError;
use crate::types::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// MCP transport used to reach a tool server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransportKind {
    #[default]
    StreamableHttp,
    Sse,
}

/// Declaration of an MCP tool. The id is derived from the name when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub server_url: String,
    #[serde(default)]
    pub active_tools: Option<Vec<String>>,
    #[serde(default)]
    pub transport: TransportKind,
    #[serde(default)]
    pub credential_reference_id: Option<EntityId>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Tool served over MCP.
#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub server_url: String,
    pub active_tools: Option<Vec<String>>,
    pub transport: TransportKind,
    pub credential_reference_id: Option<EntityId>,
    pub headers: Option<BTreeMap<String, String>>,
    pub image_url: Option<String>,
}

impl Tool {
    pub fn new(config: ToolConfig) -> Result<Self, ApiError> {
        let id = derive_id("Tool", config.id.as_deref(), &config.name)?;
        Ok(Self {
            id,
            name: config.name,
            description: config.description,
            server_url: config.server_url.trim().to_string(),
            active_tools: config.active_tools,
            transport: config.transport,
            credential_reference_id: config.credential_reference_id,
            headers: config.headers,
            image_url: config.image_url,
        })
    }

    /// Convenience builder for the common case of a named tool at a URL.
    pub fn mcp(name: impl Into<String>, server_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::new(ToolConfig {
            name: name.into(),
            server_url: server_url.into(),
            ..Default::default()
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn with_active_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_tools = Some(tools.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_credential(mut self, credential_reference_id: impl Into<EntityId>) -> Self {
        self.credential_reference_id = Some(credential_reference_id.into());
        self
    }

    /// Check that the server URL has an http(s) scheme and a usable host.
    pub fn validate_server_url(&self) -> Result<(), ApiError> {
        if server_url_is_valid(&self.server_url) {
            Ok(())
        } else {
            Err(ApiError::ConfigError(format!(
                "Tool '{}' has an invalid server URL: {}",
                self.id, self.server_url
            )))
        }
    }
}

fn server_url_is_valid(url: &str) -> bool {
    match reqwest::Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().map_or(false, |host| !host.is_empty())
        }
        Err(_) => false,
    }
}

/// Declaration of a function tool. The id is derived from the name when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionToolConfig {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_schema: Value,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    pub execute_code: String,
}

/// Tool whose implementation ships as a serialized executable body.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTool {
    id: EntityId,
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub dependencies: BTreeMap<String, String>,
    pub execute_code: String,
}

impl FunctionTool {
    pub fn new(config: FunctionToolConfig) -> Result<Self, ApiError> {
        let id = derive_id("FunctionTool", config.id.as_deref(), &config.name)?;
        if config.execute_code.trim().is_empty() {
            return Err(ApiError::ConfigError(format!(
                "FunctionTool '{}' has an empty executable body",
                id
            )));
        }
        Ok(Self {
            id,
            name: config.name,
            description: config.description,
            input_schema: config.input_schema,
            dependencies: config.dependencies,
            execute_code: config.execute_code,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Id of the hoisted function entry; one function per function tool.
    pub fn function_id(&self) -> &str {
        &self.id
    }
}
