use super::support::{agent, bare_graph, plane, scope, support_graph};
use graphsync::entity::ProjectDefaults;
use graphsync::reconcile::{enumerate_relations, reconcile_relations};
use graphsync::remote::{Operation, RelationRequest};
use graphsync::{ApiError, GraphSynchronizer};

fn three_edges() -> Vec<RelationRequest> {
    let mut graph = bare_graph(
        "g1",
        agent("a").transfers_to("b").transfers_to("c").delegates_to("b"),
    );
    graph.add_sub_agent(agent("b")).unwrap();
    graph.add_sub_agent(agent("c")).unwrap();
    let edges = enumerate_relations(&graph);
    assert_eq!(edges.len(), 3);
    edges
}

#[tokio::test]
async fn one_failure_out_of_three_is_tolerated() {
    let plane = plane();
    plane.inject_failure(Operation::CreateRelation, None, Some("a->c:transfer"), 400, "invalid target");

    let report = reconcile_relations(plane.as_ref(), &scope("p1"), "g1", &three_edges())
        .await
        .unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn all_failures_raise_aggregate_error_naming_count() {
    let plane = plane();
    plane.inject_failure(Operation::CreateRelation, None, None, 500, "relation store down");

    let err = reconcile_relations(plane.as_ref(), &scope("p1"), "g1", &three_edges())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::AggregateRelationFailure { failed: 3, .. }));
    assert!(err.to_string().contains('3'));
}

#[tokio::test]
async fn duplicate_response_is_indistinguishable_from_success() {
    let plane = plane();
    let edges = three_edges();
    plane.inject_failure(
        Operation::CreateRelation,
        None,
        None,
        422,
        r#"{"error":{"message":"Relation already exists"}}"#,
    );

    let report = reconcile_relations(plane.as_ref(), &scope("p1"), "g1", &edges)
        .await
        .unwrap();

    assert_eq!(report.failed, 0);
    assert_eq!(report.existing, 3);
}

#[tokio::test]
async fn step_by_step_initialization_survives_one_relation_failure() {
    let plane = plane();
    plane.inject_failure(
        Operation::CreateRelation,
        None,
        Some("router->partner:delegate"),
        400,
        "invalid target",
    );
    let mut graph = support_graph("g1");

    let report = GraphSynchronizer::new(plane.clone(), scope("p1"))
        .initialize_step_by_step(&mut graph, &ProjectDefaults::default())
        .await
        .unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(report.failed, 1);
    assert!(graph.is_initialized());
    assert!(plane.has_relation(&scope("p1"), "g1", "router->billing:transfer"));
    assert!(!plane.has_relation(&scope("p1"), "g1", "router->partner:delegate"));
}

#[tokio::test]
async fn step_by_step_initialization_fails_when_every_relation_fails() {
    let plane = plane();
    plane.inject_failure(Operation::CreateRelation, None, None, 500, "relation store down");
    let mut graph = support_graph("g1");

    let err = GraphSynchronizer::new(plane.clone(), scope("p1"))
        .initialize_step_by_step(&mut graph, &ProjectDefaults::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::AggregateRelationFailure { failed: 3, .. }));
    assert!(err.to_string().contains('3'));
    assert!(!graph.is_initialized());
    assert_eq!(plane.relation_count(), 0);
}
