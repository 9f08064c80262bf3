use super::support::{plane, scope};
use graphsync::reconcile::upsert;
use graphsync::remote::{EntityKind, EntityTarget, Operation};
use graphsync::ApiError;
use serde_json::json;

#[tokio::test]
async fn not_found_update_triggers_exactly_one_create() {
    let plane = plane();
    let target = EntityTarget::new(EntityKind::DataComponent, &scope("p1"), "order-summary");

    upsert(plane.as_ref(), &target, &json!({"id": "order-summary"}))
        .await
        .unwrap();

    assert_eq!(plane.calls_of(Operation::Update, EntityKind::DataComponent).len(), 1);
    assert_eq!(plane.calls_of(Operation::Create, EntityKind::DataComponent).len(), 1);
    assert!(plane.entity(&target).is_some());
}

#[tokio::test]
async fn server_error_triggers_no_create() {
    let plane = plane();
    plane.inject_failure(Operation::Update, Some(EntityKind::SubAgent), None, 500, "internal");
    let target = EntityTarget::new(EntityKind::SubAgent, &scope("p1"), "router");

    let err = upsert(plane.as_ref(), &target, &json!({"id": "router"}))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(matches!(err, ApiError::RemoteFailure { .. }));
    assert!(plane.calls_of(Operation::Create, EntityKind::SubAgent).is_empty());
}

#[tokio::test]
async fn repeated_upserts_converge() {
    let plane = plane();
    let target = EntityTarget::new(EntityKind::Tool, &scope("p1"), "weather");

    upsert(plane.as_ref(), &target, &json!({"id": "weather", "name": "Weather"}))
        .await
        .unwrap();
    upsert(plane.as_ref(), &target, &json!({"id": "weather", "name": "Weather v2"}))
        .await
        .unwrap();

    assert_eq!(plane.calls_of(Operation::Create, EntityKind::Tool).len(), 1);
    assert_eq!(plane.entity(&target).unwrap()["name"], "Weather v2");
}
