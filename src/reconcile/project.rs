//! Project synchronization.

use super::graph::GraphSynchronizer;
use super::remote_timestamps;
use super::upsert::upsert_serialized;
use crate::assembly::ProjectAssembler;
use crate::definition::FullProjectDefinition;
use crate::entity::Project;
use crate::error::ApiError;
use crate::remote::{ControlPlane, EntityKind, EntityTarget, Scope};
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Synchronizes projects of one tenant with the control plane.
pub struct ProjectSynchronizer {
    plane: Arc<dyn ControlPlane>,
    tenant_id: String,
}

impl ProjectSynchronizer {
    pub fn new(plane: Arc<dyn ControlPlane>, tenant_id: impl Into<String>) -> Self {
        Self {
            plane,
            tenant_id: tenant_id.into(),
        }
    }

    /// Graph synchronizer scoped to one of this tenant's projects.
    pub fn graphs(&self, project_id: &str) -> GraphSynchronizer {
        GraphSynchronizer::new(
            self.plane.clone(),
            Scope::project(self.tenant_id.clone(), project_id),
        )
    }

    fn target(&self, kind: EntityKind, project_id: &str) -> EntityTarget {
        EntityTarget::new(kind, &Scope::tenant(self.tenant_id.clone()), project_id)
    }

    /// Bring the remote project and all its graphs in line with `project`.
    ///
    /// The project metadata is upserted first so graph writes never race
    /// project creation. Graphs are then initialized concurrently and every
    /// outcome is awaited; if any graph fails, each failure is logged and the
    /// first one in graph-id order is returned without re-upserting the
    /// project. Otherwise the assembled project document is upserted.
    pub async fn initialize(&self, project: &mut Project) -> Result<(), ApiError> {
        if project.is_initialized() {
            debug!(project_id = project.id(), "Project already initialized; skipping");
            return Ok(());
        }
        let project_id = project.id().to_string();

        let metadata = ProjectAssembler::metadata(project);
        upsert_serialized(
            self.plane.as_ref(),
            &self.target(EntityKind::Project, &project_id),
            &metadata,
        )
        .await?;

        let defaults = project.defaults();
        let graphs = self.graphs(&project_id);
        let (graphs, defaults) = (&graphs, &defaults);
        let outcomes = join_all(project.graphs_mut().map(|graph| {
            let graph_id = graph.id().to_string();
            async move { (graph_id, graphs.initialize(graph, defaults).await) }
        }))
        .await;

        let mut first_error = None;
        for (graph_id, outcome) in outcomes {
            if let Err(e) = outcome {
                error!(project_id = %project_id, graph_id = %graph_id, error = %e, "Graph initialization failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let definition = ProjectAssembler::assemble(project)?;
        let data = self.push_full_definition(&definition).await?;

        let (created_at, updated_at) = remote_timestamps(data.as_ref());
        project.record_timestamps(created_at, updated_at);
        project.mark_initialized();
        info!(
            project_id = %project_id,
            graphs = definition.graphs.len(),
            tools = definition.tools.len(),
            "Project initialized"
        );
        Ok(())
    }

    /// Upsert a project document: metadata first, then the full definition.
    pub async fn push_definition(
        &self,
        definition: &FullProjectDefinition,
    ) -> Result<Option<Value>, ApiError> {
        upsert_serialized(
            self.plane.as_ref(),
            &self.target(EntityKind::Project, &definition.id),
            &definition.metadata(),
        )
        .await?;
        self.push_full_definition(definition).await
    }

    async fn push_full_definition(
        &self,
        definition: &FullProjectDefinition,
    ) -> Result<Option<Value>, ApiError> {
        let fingerprint = definition.fingerprint()?;
        debug!(project_id = %definition.id, fingerprint = %fingerprint, "Upserting project definition");
        upsert_serialized(
            self.plane.as_ref(),
            &self.target(EntityKind::ProjectDefinition, &definition.id),
            definition,
        )
        .await
    }
}
