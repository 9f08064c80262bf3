//! Tool preparation ahead of graph synchronization.

use crate::definition::ToolDefinition;
use crate::entity::{Graph, Tool, ToolRef};
use crate::error::ApiError;
use crate::remote::{ControlPlane, EntityKind, EntityTarget, Scope};
use crate::types::EntityId;
use futures::future::try_join_all;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::upsert::upsert_serialized;

/// Resolve and check every MCP tool referenced by the graph's agents.
///
/// With `register` set, each tool is also upserted on its own. The full
/// definition path leaves `register` off: the graph document already
/// carries the tools, and registering them separately would write each one
/// twice. Returns the ids of the prepared tools.
pub async fn prepare_tools(
    plane: &dyn ControlPlane,
    scope: &Scope,
    graph: &Graph,
    register: bool,
) -> Result<Vec<EntityId>, ApiError> {
    let mut referenced: BTreeMap<&str, &Tool> = BTreeMap::new();
    for agent in graph.sub_agents() {
        for tool_use in &agent.can_use {
            if let ToolRef::Mcp(tool) = graph.registry().tool_or_error(&tool_use.tool_id)? {
                referenced.entry(tool.id()).or_insert(tool);
            }
        }
    }

    for tool in referenced.values() {
        tool.validate_server_url()?;
    }

    if register {
        try_join_all(referenced.values().map(|tool| async move {
            let target = EntityTarget::new(EntityKind::Tool, scope, tool.id());
            upsert_serialized(plane, &target, &ToolDefinition::from(*tool)).await
        }))
        .await?;
        info!(graph_id = graph.id(), count = referenced.len(), "Registered tools");
    } else {
        debug!(
            graph_id = graph.id(),
            count = referenced.len(),
            "Prepared tools; registration left to the graph document"
        );
    }

    Ok(referenced.keys().map(|id| id.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{GraphConfig, SubAgent, SubAgentConfig, ToolConfig, ToolUse};
    use crate::remote::{InMemoryControlPlane, Operation};

    fn graph_with_tool(server_url: &str) -> Graph {
        let agent = SubAgent::new(SubAgentConfig {
            id: Some("router".into()),
            name: "Router".into(),
            ..Default::default()
        })
        .unwrap()
        .uses(ToolUse::new("weather"));
        let mut graph = Graph::new(GraphConfig {
            id: Some("g1".into()),
            name: "G1".into(),
            ..Default::default()
        })
        .unwrap()
        .with_default_agent(agent)
        .unwrap();
        graph
            .registry_mut()
            .unwrap()
            .register_tool(
                Tool::new(ToolConfig {
                    name: "Weather".into(),
                    server_url: server_url.into(),
                    ..Default::default()
                })
                .unwrap(),
            )
            .unwrap();
        graph
    }

    #[tokio::test]
    async fn prepares_without_registering() {
        let plane = InMemoryControlPlane::new();
        let graph = graph_with_tool("https://weather.example.com/mcp");

        let ids = prepare_tools(&plane, &Scope::project("acme", "p1"), &graph, false)
            .await
            .unwrap();

        assert_eq!(ids, vec!["weather".to_string()]);
        assert_eq!(plane.call_count(), 0);
    }

    #[tokio::test]
    async fn registers_each_tool_once() {
        let plane = InMemoryControlPlane::new();
        let graph = graph_with_tool("https://weather.example.com/mcp");

        prepare_tools(&plane, &Scope::project("acme", "p1"), &graph, true)
            .await
            .unwrap();

        assert_eq!(plane.calls_of(Operation::Create, EntityKind::Tool).len(), 1);
    }

    #[tokio::test]
    async fn rejects_invalid_server_url() {
        let plane = InMemoryControlPlane::new();
        let graph = graph_with_tool("weather-server");

        let result = prepare_tools(&plane, &Scope::project("acme", "p1"), &graph, true).await;

        assert!(matches!(result, Err(ApiError::ConfigError(_))));
        assert_eq!(plane.call_count(), 0);
    }
}
