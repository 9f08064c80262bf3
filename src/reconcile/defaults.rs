//! Project defaults fetched from the control plane.

use crate::entity::ProjectDefaults;
use crate::error::ApiError;
use crate::inheritance::ProjectDefaultsSource;
use crate::remote::{ControlPlane, EntityKind, EntityTarget, Scope};
use async_trait::async_trait;

use super::upsert::failure;

/// Reads a project's model and stop-when defaults from the remote project
/// record. Used when a graph is synchronized without its owning `Project`
/// in memory.
pub struct RemoteProjectDefaults<'a> {
    plane: &'a dyn ControlPlane,
    target: EntityTarget,
}

impl<'a> RemoteProjectDefaults<'a> {
    pub fn new(plane: &'a dyn ControlPlane, tenant_id: &str, project_id: &str) -> Self {
        Self {
            plane,
            target: EntityTarget::new(EntityKind::Project, &Scope::tenant(tenant_id), project_id),
        }
    }
}

#[async_trait]
impl ProjectDefaultsSource for RemoteProjectDefaults<'_> {
    async fn project_defaults(&self) -> Result<Option<ProjectDefaults>, ApiError> {
        let response = self.plane.get(&self.target).await?;
        if response.is_not_found() {
            return Err(ApiError::RemoteNotFound {
                kind: self.target.kind.to_string(),
                id: self.target.id.clone(),
            });
        }
        if !response.is_success() {
            return Err(failure("get", &self.target, &response));
        }
        match response.data() {
            Some(data) if !data.is_null() => Ok(Some(serde_json::from_value(data)?)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ModelSlot;
    use crate::remote::InMemoryControlPlane;
    use serde_json::json;

    #[tokio::test]
    async fn reads_defaults_from_project_record() {
        let plane = InMemoryControlPlane::new();
        plane.insert(
            &EntityTarget::new(EntityKind::Project, &Scope::tenant("acme"), "p1"),
            json!({
                "id": "p1",
                "name": "P1",
                "models": {"base": {"model": "gpt-4o"}},
                "stopWhen": {"transferCountIs": 4}
            }),
        );

        let defaults = RemoteProjectDefaults::new(&plane, "acme", "p1")
            .project_defaults()
            .await
            .unwrap()
            .unwrap();

        assert_eq!(defaults.models.base, Some(ModelSlot::model("gpt-4o")));
        assert_eq!(defaults.stop_when.transfer_count_is, Some(4));
    }

    #[tokio::test]
    async fn missing_project_is_not_found() {
        let plane = InMemoryControlPlane::new();
        let result = RemoteProjectDefaults::new(&plane, "acme", "ghost")
            .project_defaults()
            .await;
        assert!(matches!(result, Err(ApiError::RemoteNotFound { .. })));
    }
}
