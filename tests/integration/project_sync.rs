use super::support::{agent, bare_graph, plane, project, support_graph};
use graphsync::entity::{ModelSettings, ModelSlot, ProjectConfig};
use graphsync::remote::{EntityKind, EntityTarget, Operation, Scope};
use graphsync::ProjectSynchronizer;

#[tokio::test]
async fn agent_inherits_project_base_model_end_to_end() {
    let plane = plane();
    let mut project = project(
        "p1",
        ProjectConfig {
            models: ModelSettings::default().with_base(ModelSlot::model("gpt-4o")),
            ..Default::default()
        },
        vec![bare_graph("g1", agent("agentA"))],
    );

    ProjectSynchronizer::new(plane.clone(), "acme")
        .initialize(&mut project)
        .await
        .unwrap();

    let agent = project.graph("g1").unwrap().sub_agent("agentA").unwrap();
    assert_eq!(
        agent.models,
        ModelSettings::default().with_base(ModelSlot::model("gpt-4o"))
    );
}

#[tokio::test]
async fn project_document_registry_is_deduplicated() {
    let plane = plane();
    let mut project = project(
        "p1",
        ProjectConfig::default(),
        vec![support_graph("g1"), support_graph("g2")],
    );
    let sync = ProjectSynchronizer::new(plane.clone(), "acme");

    sync.initialize(&mut project).await.unwrap();

    let calls = plane.calls();
    let project_create = calls
        .iter()
        .position(|c| c.operation == Operation::Create && c.kind == Some(EntityKind::Project))
        .unwrap();
    let first_graph = calls
        .iter()
        .position(|c| c.kind == Some(EntityKind::GraphDefinition))
        .unwrap();
    assert!(project_create < first_graph);

    let full = plane
        .calls_of(Operation::Create, EntityKind::ProjectDefinition)
        .len();
    assert_eq!(full, 1);
    let stored = plane
        .entity(&EntityTarget::new(
            EntityKind::ProjectDefinition,
            &Scope::tenant("acme"),
            "p1",
        ))
        .unwrap();
    assert_eq!(stored["graphs"].as_object().unwrap().len(), 2);
    assert_eq!(stored["tools"].as_object().unwrap().len(), 1);
    assert_eq!(stored["dataComponents"].as_object().unwrap().len(), 1);
    assert!(project.created_at().is_some());
}

#[tokio::test]
async fn frozen_project_rejects_mutation() {
    let plane = plane();
    let mut project = project("p1", ProjectConfig::default(), vec![support_graph("g1")]);

    ProjectSynchronizer::new(plane.clone(), "acme")
        .initialize(&mut project)
        .await
        .unwrap();

    assert!(project.add_graph(support_graph("g2")).is_err());
    assert!(project.set_models(ModelSettings::default()).is_err());
}
