//! Graph synchronization.

use super::defaults::RemoteProjectDefaults;
use super::relations::{enumerate_relations, reconcile_relations, RelationReport};
use super::remote_timestamps;
use super::tools::prepare_tools;
use super::upsert::{upsert, upsert_serialized};
use crate::assembly::GraphAssembler;
use crate::definition::{AgentDefinition, FullGraphDefinition};
use crate::entity::Graph;
use crate::error::ApiError;
use crate::inheritance::{InheritanceResolver, ProjectDefaultsSource};
use crate::remote::{ControlPlane, EntityKind, EntityTarget, Scope};
use futures::future::try_join_all;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Collections carried by the graph document that the metadata record omits.
const GRAPH_COLLECTION_FIELDS: [&str; 7] = [
    "agents",
    "tools",
    "functions",
    "functionTools",
    "dataComponents",
    "artifactComponents",
    "credentialReferences",
];

/// Synchronizes graphs of one project with the control plane.
pub struct GraphSynchronizer {
    plane: Arc<dyn ControlPlane>,
    scope: Scope,
}

impl GraphSynchronizer {
    pub fn new(plane: Arc<dyn ControlPlane>, scope: Scope) -> Self {
        Self { plane, scope }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Defaults source reading the owning project's remote record.
    pub fn remote_defaults(&self) -> Result<RemoteProjectDefaults<'_>, ApiError> {
        let project_id = self.scope.project_id.as_deref().ok_or_else(|| {
            ApiError::ConfigError("Graph synchronization requires a project scope".to_string())
        })?;
        Ok(RemoteProjectDefaults::new(
            self.plane.as_ref(),
            &self.scope.tenant_id,
            project_id,
        ))
    }

    /// Bring the remote graph in line with `graph` using one document upsert.
    ///
    /// Order: validation, tool preparation, inheritance resolution, assembly,
    /// upsert. An invalid graph fails before any remote call. An initialized
    /// graph returns immediately without remote calls. On success the graph
    /// records the remote timestamps and its configuration is frozen.
    pub async fn initialize(
        &self,
        graph: &mut Graph,
        defaults: &dyn ProjectDefaultsSource,
    ) -> Result<(), ApiError> {
        if graph.is_initialized() {
            debug!(graph_id = graph.id(), "Graph already initialized; skipping");
            return Ok(());
        }
        graph.validate()?;

        prepare_tools(self.plane.as_ref(), &self.scope, graph, false).await?;
        let report = InheritanceResolver::resolve_from(graph, defaults).await;
        debug!(graph_id = graph.id(), report = ?report, "Resolved inheritance");

        let definition = GraphAssembler::assemble(graph)?;
        let data = self.push_definition(&definition).await?;

        let (created_at, updated_at) = remote_timestamps(data.as_ref());
        graph.record_timestamps(created_at, updated_at);
        graph.mark_initialized();
        info!(
            graph_id = graph.id(),
            agents = definition.agents.len(),
            "Graph initialized"
        );
        Ok(())
    }

    /// Upsert an assembled graph document as a single call.
    pub async fn push_definition(
        &self,
        definition: &FullGraphDefinition,
    ) -> Result<Option<Value>, ApiError> {
        let fingerprint = definition.fingerprint()?;
        debug!(graph_id = %definition.id, fingerprint = %fingerprint, "Upserting graph definition");
        let target = EntityTarget::new(EntityKind::GraphDefinition, &self.scope, &definition.id);
        upsert_serialized(self.plane.as_ref(), &target, definition).await
    }

    /// Entity-by-entity synchronization kept for older control planes that
    /// lack the graph document endpoint. Prefer [`GraphSynchronizer::initialize`].
    ///
    /// Order: validation, tools registered, inheritance, graph metadata, then shared
    /// entities and external agents concurrently, then sub-agents
    /// concurrently, then relation edges. Entity stages stop at the first
    /// failure; relation edges tolerate partial failure.
    pub async fn initialize_step_by_step(
        &self,
        graph: &mut Graph,
        defaults: &dyn ProjectDefaultsSource,
    ) -> Result<RelationReport, ApiError> {
        if graph.is_initialized() {
            debug!(graph_id = graph.id(), "Graph already initialized; skipping");
            return Ok(RelationReport::default());
        }
        graph.validate()?;
        let plane = self.plane.as_ref();

        prepare_tools(plane, &self.scope, graph, true).await?;
        InheritanceResolver::resolve_from(graph, defaults).await;
        let definition = GraphAssembler::assemble(graph)?;

        let graph_target = EntityTarget::new(EntityKind::Graph, &self.scope, &definition.id);
        let data = upsert(plane, &graph_target, &graph_metadata(&definition)?).await?;

        let shared = self.shared_entity_bodies(&definition)?;
        try_join_all(
            shared
                .iter()
                .map(|(target, body)| upsert(plane, target, body)),
        )
        .await?;

        let agents = self.sub_agent_bodies(&definition)?;
        try_join_all(
            agents
                .iter()
                .map(|(target, body)| upsert(plane, target, body)),
        )
        .await?;

        let edges = enumerate_relations(graph);
        let report = reconcile_relations(plane, &self.scope, graph.id(), &edges).await?;

        let (created_at, updated_at) = remote_timestamps(data.as_ref());
        graph.record_timestamps(created_at, updated_at);
        graph.mark_initialized();
        info!(
            graph_id = graph.id(),
            entities = shared.len() + agents.len(),
            relations = report.total(),
            "Graph initialized step by step"
        );
        Ok(report)
    }

    fn target(&self, kind: EntityKind, id: &str) -> EntityTarget {
        EntityTarget::new(kind, &self.scope, id)
    }

    /// Credentials, components, functions, function tools and external agents.
    fn shared_entity_bodies(
        &self,
        definition: &FullGraphDefinition,
    ) -> Result<Vec<(EntityTarget, Value)>, ApiError> {
        let mut bodies = Vec::new();
        for (id, credential) in &definition.credential_references {
            bodies.push((
                self.target(EntityKind::CredentialReference, id),
                serde_json::to_value(credential)?,
            ));
        }
        for (id, component) in &definition.data_components {
            bodies.push((
                self.target(EntityKind::DataComponent, id),
                serde_json::to_value(component)?,
            ));
        }
        for (id, component) in &definition.artifact_components {
            bodies.push((
                self.target(EntityKind::ArtifactComponent, id),
                serde_json::to_value(component)?,
            ));
        }
        for (id, function) in &definition.functions {
            bodies.push((
                self.target(EntityKind::Function, id),
                serde_json::to_value(function)?,
            ));
        }
        for (id, function_tool) in &definition.function_tools {
            bodies.push((
                self.target(EntityKind::FunctionTool, id),
                serde_json::to_value(function_tool)?,
            ));
        }
        for (id, agent) in &definition.agents {
            if let AgentDefinition::External(external) = agent {
                bodies.push((
                    self.target(EntityKind::ExternalAgent, id),
                    with_graph_id(serde_json::to_value(external)?, &definition.id),
                ));
            }
        }
        Ok(bodies)
    }

    fn sub_agent_bodies(
        &self,
        definition: &FullGraphDefinition,
    ) -> Result<Vec<(EntityTarget, Value)>, ApiError> {
        definition
            .agents
            .iter()
            .filter_map(|(id, agent)| match agent {
                AgentDefinition::Internal(internal) => Some((id, internal)),
                AgentDefinition::External(_) => None,
            })
            .map(|(id, internal)| {
                Ok((
                    self.target(EntityKind::SubAgent, id),
                    with_graph_id(serde_json::to_value(internal)?, &definition.id),
                ))
            })
            .collect()
    }
}

/// The graph document without its entity collections.
fn graph_metadata(definition: &FullGraphDefinition) -> Result<Value, ApiError> {
    let mut value = serde_json::to_value(definition)?;
    if let Value::Object(map) = &mut value {
        for field in GRAPH_COLLECTION_FIELDS {
            map.remove(field);
        }
    }
    Ok(value)
}

fn with_graph_id(mut value: Value, graph_id: &str) -> Value {
    if let Value::Object(map) = &mut value {
        map.insert("graphId".to_string(), Value::String(graph_id.to_string()));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{
        DataComponent, DataComponentConfig, GraphConfig, ModelSettings, ModelSlot,
        ProjectDefaults, SubAgent, SubAgentConfig, Tool, ToolUse,
    };
    use crate::remote::{InMemoryControlPlane, Operation};

    fn agent(id: &str) -> SubAgent {
        SubAgent::new(SubAgentConfig {
            id: Some(id.into()),
            name: id.into(),
            ..Default::default()
        })
        .unwrap()
    }

    fn graph() -> Graph {
        let mut graph = Graph::new(GraphConfig {
            id: Some("g1".into()),
            name: "Support".into(),
            ..Default::default()
        })
        .unwrap()
        .with_default_agent(
            agent("router")
                .transfers_to("billing")
                .uses(ToolUse::new("weather"))
                .with_data_component("order-summary"),
        )
        .unwrap();
        graph
            .add_sub_agent(agent("billing").transfers_to("router"))
            .unwrap();
        let registry = graph.registry_mut().unwrap();
        registry
            .register_tool(Tool::mcp("Weather", "https://weather.example.com/mcp").unwrap())
            .unwrap();
        registry
            .register_data_component(
                DataComponent::new(DataComponentConfig {
                    name: "Order Summary".into(),
                    ..Default::default()
                })
                .unwrap(),
            )
            .unwrap();
        graph
    }

    fn defaults() -> ProjectDefaults {
        ProjectDefaults {
            models: ModelSettings::default().with_base(ModelSlot::model("gpt-4o")),
            ..Default::default()
        }
    }

    fn synchronizer(plane: &Arc<InMemoryControlPlane>) -> GraphSynchronizer {
        GraphSynchronizer::new(plane.clone(), Scope::project("acme", "p1"))
    }

    #[tokio::test]
    async fn full_path_issues_one_document_upsert() {
        let plane = Arc::new(InMemoryControlPlane::new());
        let mut graph = graph();

        synchronizer(&plane).initialize(&mut graph, &defaults()).await.unwrap();

        let kinds: Vec<_> = plane.calls().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![Some(EntityKind::GraphDefinition), Some(EntityKind::GraphDefinition)]
        );
        assert!(graph.is_initialized());
        assert!(graph.created_at().is_some());
        assert_eq!(
            graph.sub_agent("billing").unwrap().models.base,
            Some(ModelSlot::model("gpt-4o"))
        );
    }

    #[tokio::test]
    async fn second_initialize_makes_no_calls() {
        let plane = Arc::new(InMemoryControlPlane::new());
        let sync = synchronizer(&plane);
        let mut graph = graph();

        sync.initialize(&mut graph, &defaults()).await.unwrap();
        plane.reset_calls();
        sync.initialize(&mut graph, &defaults()).await.unwrap();

        assert_eq!(plane.call_count(), 0);
    }

    #[tokio::test]
    async fn remote_timestamps_appear_in_later_assemblies() {
        let plane = Arc::new(InMemoryControlPlane::new());
        let mut graph = graph();

        synchronizer(&plane).initialize(&mut graph, &defaults()).await.unwrap();

        let definition = GraphAssembler::assemble(&graph).unwrap();
        assert!(definition.created_at.is_some());
        assert!(definition.updated_at.is_some());
    }

    #[tokio::test]
    async fn step_by_step_writes_entities_before_relations() {
        let plane = Arc::new(InMemoryControlPlane::new());
        let mut graph = graph();

        let report = synchronizer(&plane)
            .initialize_step_by_step(&mut graph, &defaults())
            .await
            .unwrap();

        assert_eq!(report.created, 2);
        let calls = plane.calls();
        let first_relation = calls
            .iter()
            .position(|c| c.operation == Operation::CreateRelation)
            .unwrap();
        let last_agent = calls
            .iter()
            .rposition(|c| c.kind == Some(EntityKind::SubAgent))
            .unwrap();
        let graph_upsert = calls
            .iter()
            .position(|c| c.kind == Some(EntityKind::Graph))
            .unwrap();
        let tool_upsert = calls
            .iter()
            .position(|c| c.kind == Some(EntityKind::Tool))
            .unwrap();
        assert!(tool_upsert < graph_upsert);
        assert!(last_agent < first_relation);
        assert_eq!(
            plane
                .calls_of(Operation::Create, EntityKind::DataComponent)
                .len(),
            1
        );
        assert_eq!(
            plane
                .entity(&EntityTarget::new(
                    EntityKind::SubAgent,
                    &Scope::project("acme", "p1"),
                    "router"
                ))
                .unwrap()["graphId"],
            "g1"
        );
        assert!(graph.is_initialized());
    }

    #[tokio::test]
    async fn failed_document_upsert_leaves_graph_mutable() {
        let plane = Arc::new(InMemoryControlPlane::new());
        plane.inject_failure(Operation::Update, None, None, 500, "boom");
        let mut graph = graph();

        let result = synchronizer(&plane).initialize(&mut graph, &defaults()).await;

        assert!(result.is_err());
        assert!(!graph.is_initialized());
        assert!(graph.registry_mut().is_ok());
    }

    fn graph_without_default_agent() -> Graph {
        let mut graph = Graph::new(GraphConfig {
            id: Some("g1".into()),
            name: "Support".into(),
            ..Default::default()
        })
        .unwrap();
        graph
            .add_sub_agent(agent("router").uses(ToolUse::new("weather")))
            .unwrap();
        graph
            .registry_mut()
            .unwrap()
            .register_tool(Tool::mcp("Weather", "https://weather.example.com/mcp").unwrap())
            .unwrap();
        graph
    }

    #[tokio::test]
    async fn invalid_graph_fails_before_remote_calls() {
        let plane = Arc::new(InMemoryControlPlane::new());
        let mut graph = graph_without_default_agent();

        let err = synchronizer(&plane)
            .initialize(&mut graph, &defaults())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::ConfigError(_)));
        assert_eq!(plane.call_count(), 0);
        assert_eq!(graph.stop_when().transfer_count_is, None);
        assert!(!graph.is_initialized());
    }

    #[tokio::test]
    async fn invalid_graph_fails_before_step_by_step_calls() {
        let plane = Arc::new(InMemoryControlPlane::new());
        let mut graph = graph_without_default_agent();

        let err = synchronizer(&plane)
            .initialize_step_by_step(&mut graph, &defaults())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::ConfigError(_)));
        assert_eq!(plane.call_count(), 0);
        assert!(plane.calls_of(Operation::Create, EntityKind::Tool).is_empty());
        assert_eq!(graph.stop_when().transfer_count_is, None);
        assert!(graph.sub_agent("router").unwrap().models.base.is_none());
    }

    #[test]
    fn metadata_drops_collections() {
        let definition = GraphAssembler::assemble(&graph()).unwrap();
        let metadata = graph_metadata(&definition).unwrap();
        assert_eq!(metadata["defaultAgentId"], "router");
        assert!(metadata.get("agents").is_none());
        assert!(metadata.get("tools").is_none());
    }
}
