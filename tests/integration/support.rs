//! Shared fixtures.

use graphsync::entity::{
    DataComponent, DataComponentConfig, ExternalAgent, ExternalAgentConfig, Graph, GraphConfig,
    Project, ProjectConfig, SubAgent, SubAgentConfig, Tool, ToolUse,
};
use graphsync::remote::{InMemoryControlPlane, Scope};
use std::sync::Arc;

pub const TENANT: &str = "acme";

pub fn plane() -> Arc<InMemoryControlPlane> {
    Arc::new(InMemoryControlPlane::new())
}

pub fn scope(project_id: &str) -> Scope {
    Scope::project(TENANT, project_id)
}

pub fn agent(id: &str) -> SubAgent {
    SubAgent::new(SubAgentConfig {
        id: Some(id.into()),
        name: id.into(),
        prompt: format!("You are {}.", id),
        ..Default::default()
    })
    .unwrap()
}

pub fn bare_graph(id: &str, default_agent: SubAgent) -> Graph {
    Graph::new(GraphConfig {
        id: Some(id.into()),
        name: id.into(),
        ..Default::default()
    })
    .unwrap()
    .with_default_agent(default_agent)
    .unwrap()
}

/// router <-> billing transfers, router delegates to billing and to an
/// external partner; router uses the weather tool and a data component.
pub fn support_graph(id: &str) -> Graph {
    let mut graph = bare_graph(
        id,
        agent("router")
            .transfers_to("billing")
            .delegates_to("partner")
            .uses(ToolUse::new("weather").with_selection(["forecast"]))
            .with_data_component("order-summary"),
    );
    graph
        .add_sub_agent(agent("billing").transfers_to("router"))
        .unwrap();
    graph
        .add_external_agent(
            ExternalAgent::new(ExternalAgentConfig {
                id: Some("partner".into()),
                name: "Partner".into(),
                base_url: "https://partner.example.com/a2a".into(),
                ..Default::default()
            })
            .unwrap(),
        )
        .unwrap();

    let registry = graph.registry_mut().unwrap();
    registry
        .register_tool(
            Tool::mcp("Weather", "https://weather.example.com/mcp")
                .unwrap()
                .with_active_tools(["forecast", "alerts"]),
        )
        .unwrap();
    registry
        .register_data_component(
            DataComponent::new(DataComponentConfig {
                name: "Order Summary".into(),
                description: "Summary of an order".into(),
                ..Default::default()
            })
            .unwrap(),
        )
        .unwrap();
    graph
}

pub fn project(id: &str, config: ProjectConfig, graphs: Vec<Graph>) -> Project {
    let mut project = Project::new(ProjectConfig {
        id: Some(id.into()),
        name: id.into(),
        ..config
    })
    .unwrap();
    for graph in graphs {
        project.add_graph(graph).unwrap();
    }
    project
}
