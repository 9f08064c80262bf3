//! Remote Control Plane
//!
//! Addressing, response classification and the async port through which the
//! reconciliation engine talks to the control plane. Two implementations
//! ship with the crate: an HTTP client and an in-memory emulation.

pub mod http;
pub mod memory;

pub use http::HttpControlPlane;
pub use memory::{InMemoryControlPlane, Operation, RecordedCall};

use crate::error::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Every resource kind the engine synchronizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Project,
    ProjectDefinition,
    Graph,
    GraphDefinition,
    SubAgent,
    ExternalAgent,
    Tool,
    Function,
    FunctionTool,
    DataComponent,
    ArtifactComponent,
    CredentialReference,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::ProjectDefinition => "project definition",
            EntityKind::Graph => "graph",
            EntityKind::GraphDefinition => "graph definition",
            EntityKind::SubAgent => "agent",
            EntityKind::ExternalAgent => "external agent",
            EntityKind::Tool => "tool",
            EntityKind::Function => "function",
            EntityKind::FunctionTool => "function tool",
            EntityKind::DataComponent => "data component",
            EntityKind::ArtifactComponent => "artifact component",
            EntityKind::CredentialReference => "credential reference",
        }
    }

    /// URL path segment of the collection.
    pub fn path_segment(&self) -> &'static str {
        match self {
            EntityKind::Project => "projects",
            EntityKind::ProjectDefinition => "project-full",
            EntityKind::Graph => "agent-graphs",
            EntityKind::GraphDefinition => "graph",
            EntityKind::SubAgent => "agents",
            EntityKind::ExternalAgent => "external-agents",
            EntityKind::Tool => "tools",
            EntityKind::Function => "functions",
            EntityKind::FunctionTool => "function-tools",
            EntityKind::DataComponent => "data-components",
            EntityKind::ArtifactComponent => "artifact-components",
            EntityKind::CredentialReference => "credentials",
        }
    }

    /// Whether the collection lives under a project rather than the tenant.
    pub fn is_project_scoped(&self) -> bool {
        !matches!(self, EntityKind::Project | EntityKind::ProjectDefinition)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tenant and (for project-scoped kinds) project an entity belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Scope {
    pub tenant_id: String,
    pub project_id: Option<String>,
}

impl Scope {
    pub fn tenant(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            project_id: None,
        }
    }

    pub fn project(tenant_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            project_id: Some(project_id.into()),
        }
    }

    fn base_segments(&self, project_scoped: bool) -> Result<Vec<String>, ApiError> {
        let mut segments = vec!["tenants".to_string(), self.tenant_id.clone()];
        if project_scoped {
            let project_id = self.project_id.as_ref().ok_or_else(|| {
                ApiError::ConfigError(
                    "Project-scoped request issued without a project id".to_string(),
                )
            })?;
            segments.push("projects".to_string());
            segments.push(project_id.clone());
        }
        Ok(segments)
    }

    /// Path segments of the relation collection.
    pub fn relation_segments(&self) -> Result<Vec<String>, ApiError> {
        let mut segments = self.base_segments(true)?;
        segments.push("agent-relations".to_string());
        Ok(segments)
    }
}

/// Address of one entity on the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityTarget {
    pub kind: EntityKind,
    pub scope: Scope,
    pub id: String,
}

impl EntityTarget {
    pub fn new(kind: EntityKind, scope: &Scope, id: impl Into<String>) -> Self {
        Self {
            kind,
            scope: scope.clone(),
            id: id.into(),
        }
    }

    /// Path segments of the collection, used for create.
    pub fn collection_segments(&self) -> Result<Vec<String>, ApiError> {
        let mut segments = self.scope.base_segments(self.kind.is_project_scoped())?;
        segments.push(self.kind.path_segment().to_string());
        Ok(segments)
    }

    /// Path segments of the entity, used for get and update.
    pub fn item_segments(&self) -> Result<Vec<String>, ApiError> {
        let mut segments = self.collection_segments()?;
        segments.push(self.id.clone());
        Ok(segments)
    }
}

/// Handoff semantics of a relation edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    Transfer,
    Delegate,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Transfer => "transfer",
            RelationType::Delegate => "delegate",
        }
    }
}

/// Body of a relation-create call. Exactly one of `target_agent_id` and
/// `external_agent_id` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationRequest {
    pub graph_id: String,
    pub source_agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_agent_id: Option<String>,
    pub relation_type: RelationType,
}

impl RelationRequest {
    pub fn target_id(&self) -> &str {
        self.target_agent_id
            .as_deref()
            .or(self.external_agent_id.as_deref())
            .unwrap_or_default()
    }

    /// `source->target:type`, used in logs and call records.
    pub fn edge_key(&self) -> String {
        format!(
            "{}->{}:{}",
            self.source_agent_id,
            self.target_id(),
            self.relation_type.as_str()
        )
    }
}

/// Raw status and body of a control-plane response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: String,
}

impl RemoteResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 response wrapping `data` in the success envelope.
    pub fn ok(data: Value) -> Self {
        Self::new(200, serde_json::json!({ "data": data }).to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Conflict-class response whose body says the entity already exists.
    pub fn is_duplicate(&self) -> bool {
        matches!(self.status, 409 | 422) && self.body.to_ascii_lowercase().contains("already exists")
    }

    /// Payload of the success envelope, if the body has one.
    pub fn data(&self) -> Option<Value> {
        let mut parsed: Value = serde_json::from_str(&self.body).ok()?;
        parsed.get_mut("data").map(Value::take)
    }

    /// Human-readable error from a structured or free-text error body.
    pub fn error_message(&self) -> String {
        if let Ok(parsed) = serde_json::from_str::<Value>(&self.body) {
            let structured = parsed
                .pointer("/error/message")
                .or_else(|| parsed.get("message"))
                .or_else(|| parsed.get("error"))
                .and_then(Value::as_str);
            if let Some(message) = structured {
                return message.to_string();
            }
        }
        let trimmed = self.body.trim();
        if trimmed.is_empty() {
            format!("empty response body (HTTP {})", self.status)
        } else {
            trimmed.to_string()
        }
    }
}

/// Control-plane port. Implementations report every HTTP status as a
/// `RemoteResponse`; only transport failures are errors.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn get(&self, target: &EntityTarget) -> Result<RemoteResponse, ApiError>;

    async fn update(&self, target: &EntityTarget, body: &Value) -> Result<RemoteResponse, ApiError>;

    async fn create(&self, target: &EntityTarget, body: &Value) -> Result<RemoteResponse, ApiError>;

    async fn create_relation(
        &self,
        scope: &Scope,
        relation: &RelationRequest,
    ) -> Result<RemoteResponse, ApiError>;
}
