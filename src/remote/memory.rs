//! In-memory control plane.
//!
//! Emulates the control plane's observable behavior: updates of unknown
//! entities answer 404, creates store the entity, and creating a relation
//! twice answers 422 "already exists". Every call is recorded, and failures
//! can be injected per operation and entity. Used for dry runs and tests.

use super::{ControlPlane, EntityKind, EntityTarget, RelationRequest, RemoteResponse, Scope};
use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Kind of remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Update,
    Create,
    CreateRelation,
}

/// One call as seen by the control plane. For relation calls `id` is the
/// edge key (`source->target:type`) and `kind` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub operation: Operation,
    pub kind: Option<EntityKind>,
    pub id: String,
}

#[derive(Debug, Clone)]
struct InjectedFailure {
    operation: Operation,
    kind: Option<EntityKind>,
    id: Option<String>,
    response: RemoteResponse,
}

impl InjectedFailure {
    fn matches(&self, call: &RecordedCall) -> bool {
        self.operation == call.operation
            && (self.kind.is_none() || self.kind == call.kind)
            && self.id.as_ref().map_or(true, |id| *id == call.id)
    }
}

type EntityKey = (EntityKind, Scope, String);
type RelationKey = (Scope, String, String);

#[derive(Default)]
struct State {
    entities: BTreeMap<EntityKey, Value>,
    relations: BTreeSet<RelationKey>,
    calls: Vec<RecordedCall>,
    failures: Vec<InjectedFailure>,
}

#[derive(Default)]
pub struct InMemoryControlPlane {
    state: Mutex<State>,
}

impl InMemoryControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every matching call with `status`/`body` instead of serving it.
    /// `kind` and `id` of `None` match anything.
    pub fn inject_failure(
        &self,
        operation: Operation,
        kind: Option<EntityKind>,
        id: Option<&str>,
        status: u16,
        body: &str,
    ) {
        self.state.lock().failures.push(InjectedFailure {
            operation,
            kind,
            id: id.map(str::to_string),
            response: RemoteResponse::new(status, body),
        });
    }

    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    /// Seed an entity as if it had been created earlier.
    pub fn insert(&self, target: &EntityTarget, body: Value) {
        self.state.lock().entities.insert(key_of(target), body);
    }

    pub fn entity(&self, target: &EntityTarget) -> Option<Value> {
        self.state.lock().entities.get(&key_of(target)).cloned()
    }

    pub fn has_relation(&self, scope: &Scope, graph_id: &str, edge_key: &str) -> bool {
        self.state.lock().relations.contains(&(
            scope.clone(),
            graph_id.to_string(),
            edge_key.to_string(),
        ))
    }

    pub fn relation_count(&self) -> usize {
        self.state.lock().relations.len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Calls with the given operation and kind.
    pub fn calls_of(&self, operation: Operation, kind: EntityKind) -> Vec<RecordedCall> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.operation == operation && call.kind == Some(kind))
            .cloned()
            .collect()
    }

    pub fn reset_calls(&self) {
        self.state.lock().calls.clear();
    }

    fn record(state: &mut State, call: RecordedCall) -> Option<RemoteResponse> {
        let injected = state
            .failures
            .iter()
            .find(|failure| failure.matches(&call))
            .map(|failure| failure.response.clone());
        state.calls.push(call);
        injected
    }
}

fn key_of(target: &EntityTarget) -> EntityKey {
    (target.kind, target.scope.clone(), target.id.clone())
}

fn stamped(body: &Value, created_at: Option<&Value>) -> Value {
    let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    let mut stored = body.clone();
    if let Value::Object(map) = &mut stored {
        map.insert(
            "createdAt".to_string(),
            created_at.cloned().unwrap_or_else(|| now.clone()),
        );
        map.insert("updatedAt".to_string(), now);
    }
    stored
}

fn not_found(target: &EntityTarget) -> RemoteResponse {
    RemoteResponse::new(
        404,
        json!({ "error": { "message": format!("{} {} not found", target.kind, target.id) } })
            .to_string(),
    )
}

#[async_trait]
impl ControlPlane for InMemoryControlPlane {
    async fn get(&self, target: &EntityTarget) -> Result<RemoteResponse, ApiError> {
        let mut state = self.state.lock();
        let call = RecordedCall {
            operation: Operation::Get,
            kind: Some(target.kind),
            id: target.id.clone(),
        };
        if let Some(response) = Self::record(&mut state, call) {
            return Ok(response);
        }
        Ok(match state.entities.get(&key_of(target)) {
            Some(entity) => RemoteResponse::ok(entity.clone()),
            None => not_found(target),
        })
    }

    async fn update(&self, target: &EntityTarget, body: &Value) -> Result<RemoteResponse, ApiError> {
        let mut state = self.state.lock();
        let call = RecordedCall {
            operation: Operation::Update,
            kind: Some(target.kind),
            id: target.id.clone(),
        };
        if let Some(response) = Self::record(&mut state, call) {
            return Ok(response);
        }
        let key = key_of(target);
        let Some(existing) = state.entities.get(&key) else {
            return Ok(not_found(target));
        };
        let stored = stamped(body, existing.get("createdAt"));
        state.entities.insert(key, stored.clone());
        Ok(RemoteResponse::ok(stored))
    }

    async fn create(&self, target: &EntityTarget, body: &Value) -> Result<RemoteResponse, ApiError> {
        let mut state = self.state.lock();
        let call = RecordedCall {
            operation: Operation::Create,
            kind: Some(target.kind),
            id: target.id.clone(),
        };
        if let Some(response) = Self::record(&mut state, call) {
            return Ok(response);
        }
        let key = key_of(target);
        if state.entities.contains_key(&key) {
            return Ok(RemoteResponse::new(
                409,
                json!({ "error": { "message": format!("{} {} already exists", target.kind, target.id) } })
                    .to_string(),
            ));
        }
        let stored = stamped(body, None);
        state.entities.insert(key, stored.clone());
        Ok(RemoteResponse::new(
            201,
            json!({ "data": stored }).to_string(),
        ))
    }

    async fn create_relation(
        &self,
        scope: &Scope,
        relation: &RelationRequest,
    ) -> Result<RemoteResponse, ApiError> {
        let mut state = self.state.lock();
        let edge_key = relation.edge_key();
        let call = RecordedCall {
            operation: Operation::CreateRelation,
            kind: None,
            id: edge_key.clone(),
        };
        if let Some(response) = Self::record(&mut state, call) {
            return Ok(response);
        }
        let inserted = state
            .relations
            .insert((scope.clone(), relation.graph_id.clone(), edge_key));
        if !inserted {
            return Ok(RemoteResponse::new(
                422,
                json!({ "error": { "message": "Relation already exists" } }).to_string(),
            ));
        }
        Ok(RemoteResponse::new(
            201,
            json!({ "data": serde_json::to_value(relation)? }).to_string(),
        ))
    }
}
