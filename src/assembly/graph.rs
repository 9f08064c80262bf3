//! Graph assembly: entity graph to Full Graph Definition.

use crate::definition::{
    AgentDefinition, ArtifactComponentDefinition, CanUseDefinition, CredentialReferenceDefinition,
    DataComponentDefinition, ExternalAgentDefinition, FullGraphDefinition, FunctionDefinition,
    FunctionToolDefinition, InternalAgentDefinition, McpServerDefinition, McpServerUrl,
    McpTransport, ToolDefinition, ToolServerConfig,
};
use crate::entity::{
    ArtifactComponent, CredentialReference, DataComponent, EntityRegistry, ExternalAgent,
    FunctionTool, Graph, StopWhen, SubAgent, Tool, ToolRef, ToolUse,
};
use crate::error::ApiError;
use crate::types::{EntityId, DEFAULT_AGENT_DESCRIPTION};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Builds the canonical document for a graph.
///
/// Assembly only reads entity state: it is deterministic, has no side
/// effects, and may be repeated freely. It reflects whatever inheritance has
/// been resolved so far.
pub struct GraphAssembler;

impl GraphAssembler {
    pub fn assemble(graph: &Graph) -> Result<FullGraphDefinition, ApiError> {
        graph.validate()?;
        let registry = graph.registry();

        let mut agents = BTreeMap::new();
        let mut tools = BTreeMap::new();
        let mut functions = BTreeMap::new();
        let mut function_tools = BTreeMap::new();
        let mut data_components = BTreeMap::new();
        let mut artifact_components = BTreeMap::new();
        let mut credential_ids = BTreeSet::new();

        for agent in graph.sub_agents() {
            for tool_use in &agent.can_use {
                match registry.tool_or_error(&tool_use.tool_id)? {
                    ToolRef::Mcp(tool) => {
                        if let Some(credential) = &tool.credential_reference_id {
                            credential_ids.insert(credential.clone());
                        }
                        tools
                            .entry(tool.id().to_string())
                            .or_insert_with(|| ToolDefinition::from(tool));
                    }
                    ToolRef::Function(tool) => {
                        functions
                            .entry(tool.function_id().to_string())
                            .or_insert_with(|| FunctionDefinition::from(tool));
                        function_tools
                            .entry(tool.id().to_string())
                            .or_insert_with(|| function_tool_definition(tool, graph.id()));
                    }
                }
            }
            for id in &agent.data_components {
                if let Some(component) = registry.data_component(id) {
                    data_components
                        .entry(id.clone())
                        .or_insert_with(|| DataComponentDefinition::from(component));
                }
            }
            for id in &agent.artifact_components {
                if let Some(component) = registry.artifact_component(id) {
                    artifact_components
                        .entry(id.clone())
                        .or_insert_with(|| ArtifactComponentDefinition::from(component));
                }
            }
            agents.insert(
                agent.id().to_string(),
                AgentDefinition::Internal(InternalAgentDefinition::from(agent)),
            );
        }

        for agent in graph.external_agents() {
            if let Some(credential) = &agent.credential_reference_id {
                credential_ids.insert(credential.clone());
            }
            agents.insert(
                agent.id().to_string(),
                AgentDefinition::External(ExternalAgentDefinition::from(agent)),
            );
        }

        let credential_references = credential_definitions(registry, credential_ids);

        Ok(FullGraphDefinition {
            id: graph.id().to_string(),
            name: graph.name().to_string(),
            description: graph.description().map(str::to_string),
            default_agent_id: graph.default_agent_id().map(str::to_string),
            agents,
            tools,
            functions,
            function_tools,
            data_components,
            artifact_components,
            credential_references,
            models: Some(graph.models().clone()).filter(|m| !m.is_empty()),
            stop_when: Some(*graph.stop_when()).filter(|s| !s.is_empty()),
            status_updates: graph.status_updates().cloned(),
            graph_prompt: graph.prompt().map(str::to_string),
            created_at: graph.created_at().map(format_timestamp),
            updated_at: graph.updated_at().map(format_timestamp),
        })
    }
}

pub(crate) fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn credential_definitions(
    registry: &EntityRegistry,
    ids: BTreeSet<EntityId>,
) -> BTreeMap<EntityId, CredentialReferenceDefinition> {
    ids.into_iter()
        .map(|id| {
            let definition = match registry.credential(&id) {
                Some(credential) => CredentialReferenceDefinition::from(credential),
                None => CredentialReferenceDefinition {
                    id: id.clone(),
                    kind: None,
                    credential_store_id: None,
                    retrieval_params: None,
                },
            };
            (id, definition)
        })
        .collect()
}

/// Keep first occurrences, drop repeats.
fn dedup_ids(ids: &[EntityId]) -> Vec<EntityId> {
    let mut seen = BTreeSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

/// One entry per tool; the first use of a tool wins.
fn dedup_tool_uses(uses: &[ToolUse]) -> Vec<CanUseDefinition> {
    let mut seen = BTreeSet::new();
    uses.iter()
        .filter(|tool_use| seen.insert(tool_use.tool_id.as_str()))
        .map(|tool_use| CanUseDefinition {
            tool_id: tool_use.tool_id.clone(),
            tool_selection: tool_use.tool_selection.clone(),
            headers: tool_use.headers.clone(),
        })
        .collect()
}

impl From<&SubAgent> for InternalAgentDefinition {
    fn from(agent: &SubAgent) -> Self {
        let description = if agent.description.trim().is_empty() {
            DEFAULT_AGENT_DESCRIPTION.to_string()
        } else {
            agent.description.clone()
        };
        let stop_when = agent.stop_when.step_count_is.map(StopWhen::steps);
        Self {
            id: agent.id().to_string(),
            name: agent.name.clone(),
            description,
            prompt: agent.prompt.clone(),
            models: Some(agent.models.clone()).filter(|m| !m.is_empty()),
            stop_when,
            can_transfer_to: dedup_ids(&agent.can_transfer_to),
            can_delegate_to: dedup_ids(&agent.can_delegate_to),
            can_use: dedup_tool_uses(&agent.can_use),
            data_components: dedup_ids(&agent.data_components),
            artifact_components: dedup_ids(&agent.artifact_components),
        }
    }
}

impl From<&ExternalAgent> for ExternalAgentDefinition {
    fn from(agent: &ExternalAgent) -> Self {
        Self {
            id: agent.id().to_string(),
            name: agent.name.clone(),
            description: agent.description.clone(),
            base_url: agent.base_url.clone(),
            credential_reference_id: agent.credential_reference_id.clone(),
            headers: agent.headers.clone(),
        }
    }
}

impl From<&Tool> for ToolDefinition {
    fn from(tool: &Tool) -> Self {
        Self {
            id: tool.id().to_string(),
            name: tool.name.clone(),
            description: tool.description.clone(),
            config: ToolServerConfig {
                kind: "mcp".to_string(),
                mcp: McpServerDefinition {
                    server: McpServerUrl {
                        url: tool.server_url.clone(),
                    },
                    transport: McpTransport {
                        kind: tool.transport,
                    },
                    active_tools: tool.active_tools.clone(),
                },
            },
            credential_reference_id: tool.credential_reference_id.clone(),
            headers: tool.headers.clone(),
            image_url: tool.image_url.clone(),
        }
    }
}

impl From<&FunctionTool> for FunctionDefinition {
    fn from(tool: &FunctionTool) -> Self {
        Self {
            id: tool.function_id().to_string(),
            input_schema: tool.input_schema.clone(),
            execute_code: tool.execute_code.clone(),
            dependencies: tool.dependencies.clone(),
        }
    }
}

fn function_tool_definition(tool: &FunctionTool, graph_id: &str) -> FunctionToolDefinition {
    FunctionToolDefinition {
        id: tool.id().to_string(),
        name: tool.name.clone(),
        description: tool.description.clone(),
        function_id: tool.function_id().to_string(),
        graph_id: graph_id.to_string(),
    }
}

impl From<&DataComponent> for DataComponentDefinition {
    fn from(component: &DataComponent) -> Self {
        Self {
            id: component.id().to_string(),
            name: component.name.clone(),
            description: component.description.clone(),
            props: component.props.clone(),
        }
    }
}

impl From<&ArtifactComponent> for ArtifactComponentDefinition {
    fn from(component: &ArtifactComponent) -> Self {
        Self {
            id: component.id().to_string(),
            name: component.name.clone(),
            description: component.description.clone(),
            summary_props: component.summary_props.clone(),
            full_props: component.full_props.clone(),
        }
    }
}

impl From<&CredentialReference> for CredentialReferenceDefinition {
    fn from(credential: &CredentialReference) -> Self {
        Self {
            id: credential.id().to_string(),
            kind: Some(credential.kind.clone()),
            credential_store_id: Some(credential.credential_store_id.clone()),
            retrieval_params: Some(credential.retrieval_params.clone()),
        }
    }
}
