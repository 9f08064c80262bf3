use super::support::{agent, bare_graph, plane, scope, support_graph, TENANT};
use graphsync::definition::AgentDefinition;
use graphsync::entity::{ModelSettings, ModelSlot, ProjectDefaults, StopWhen, Tool, ToolUse};
use graphsync::remote::{EntityKind, EntityTarget, Operation, Scope};
use graphsync::{GraphAssembler, GraphSynchronizer};
use serde_json::json;

fn defaults() -> ProjectDefaults {
    ProjectDefaults {
        models: ModelSettings::default().with_base(ModelSlot::model("gpt-4o")),
        stop_when: StopWhen::steps(12),
    }
}

#[tokio::test]
async fn initializing_twice_issues_requests_once() {
    let plane = plane();
    let sync = GraphSynchronizer::new(plane.clone(), scope("p1"));
    let mut graph = support_graph("g1");

    sync.initialize(&mut graph, &defaults()).await.unwrap();
    let first = plane.call_count();
    sync.initialize(&mut graph, &defaults()).await.unwrap();

    assert!(first > 0);
    assert_eq!(plane.call_count(), first);
}

#[tokio::test]
async fn document_carries_effective_settings_and_hoisted_entities() {
    let plane = plane();
    let sync = GraphSynchronizer::new(plane.clone(), scope("p1"));
    let mut graph = support_graph("g1");

    sync.initialize(&mut graph, &defaults()).await.unwrap();

    let stored = plane
        .entity(&EntityTarget::new(EntityKind::GraphDefinition, &scope("p1"), "g1"))
        .unwrap();
    assert_eq!(stored["stopWhen"]["transferCountIs"], 10);
    assert_eq!(stored["agents"]["billing"]["models"]["base"]["model"], "gpt-4o");
    assert_eq!(stored["agents"]["billing"]["stopWhen"]["stepCountIs"], 12);
    assert_eq!(stored["agents"]["partner"]["type"], "external");
    assert_eq!(
        stored["agents"]["router"]["canUse"],
        json!([{"toolId": "weather", "toolSelection": ["forecast"], "headers": null}])
    );
    assert!(stored["tools"].get("weather").is_some());
    assert!(stored["dataComponents"].get("order-summary").is_some());
    assert!(plane.calls_of(Operation::Create, EntityKind::Tool).is_empty());
}

#[tokio::test]
async fn remote_defaults_feed_inheritance() {
    let plane = plane();
    plane.insert(
        &EntityTarget::new(EntityKind::Project, &Scope::tenant(TENANT), "p1"),
        json!({"id": "p1", "name": "P1", "models": {"summarizer": {"model": "gpt-4o-mini"}}}),
    );
    let sync = GraphSynchronizer::new(plane.clone(), scope("p1"));
    let mut graph = support_graph("g1");

    let source = sync.remote_defaults().unwrap();
    sync.initialize(&mut graph, &source).await.unwrap();

    assert_eq!(
        graph.sub_agent("router").unwrap().models.summarizer,
        Some(ModelSlot::model("gpt-4o-mini"))
    );
}

#[tokio::test]
async fn missing_remote_project_degrades_to_no_defaults() {
    let plane = plane();
    let sync = GraphSynchronizer::new(plane.clone(), scope("ghost"));
    let mut graph = support_graph("g1");

    let source = sync.remote_defaults().unwrap();
    sync.initialize(&mut graph, &source).await.unwrap();

    assert!(graph.is_initialized());
    assert_eq!(graph.stop_when().transfer_count_is, Some(10));
    assert_eq!(graph.sub_agent("router").unwrap().models.base, None);
}

#[tokio::test]
async fn step_by_step_path_reconciles_external_delegation() {
    let plane = plane();
    let sync = GraphSynchronizer::new(plane.clone(), scope("p1"));
    let mut graph = support_graph("g1");

    let report = sync
        .initialize_step_by_step(&mut graph, &defaults())
        .await
        .unwrap();

    assert_eq!(report.created, 3);
    assert!(plane.has_relation(&scope("p1"), "g1", "router->partner:delegate"));
    assert_eq!(plane.calls_of(Operation::Create, EntityKind::ExternalAgent).len(), 1);
    assert_eq!(plane.calls_of(Operation::Create, EntityKind::SubAgent).len(), 2);
    assert!(plane.calls_of(Operation::Create, EntityKind::GraphDefinition).is_empty());
}

#[tokio::test]
async fn tool_on_single_label_service_host_initializes() {
    let plane = plane();
    let sync = GraphSynchronizer::new(plane.clone(), scope("p1"));
    let mut graph = bare_graph("g1", agent("router").uses(ToolUse::new("weather")));
    graph
        .registry_mut()
        .unwrap()
        .register_tool(Tool::mcp("Weather", "http://mcp-server:8080/mcp").unwrap())
        .unwrap();

    sync.initialize(&mut graph, &defaults()).await.unwrap();

    let stored = plane
        .entity(&EntityTarget::new(EntityKind::GraphDefinition, &scope("p1"), "g1"))
        .unwrap();
    assert_eq!(
        stored["tools"]["weather"]["config"]["mcp"]["server"]["url"],
        "http://mcp-server:8080/mcp"
    );
    assert!(graph.is_initialized());
}

#[test]
fn assembly_is_repeatable() {
    let graph = support_graph("g1");
    let first = GraphAssembler::assemble(&graph).unwrap();
    let second = GraphAssembler::assemble(&graph).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
    assert!(matches!(
        first.agents.get("router"),
        Some(AgentDefinition::Internal(agent)) if agent.description == "No description provided"
    ));
}
