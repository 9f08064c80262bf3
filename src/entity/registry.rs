//! Explicit registry of shareable entities.
//!
//! Tools, function tools, components and credential references are registered
//! here by id and referenced from sub-agents by id. A registry is an ordinary
//! value owned by a graph, so independent synchronization runs never share
//! state.

use super::component::{ArtifactComponent, CredentialReference, DataComponent};
use super::tool::{FunctionTool, Tool};
use crate::error::ApiError;
use std::collections::BTreeMap;

/// A tool reference resolved against the registry.
#[derive(Debug, Clone, Copy)]
pub enum ToolRef<'a> {
    Mcp(&'a Tool),
    Function(&'a FunctionTool),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityRegistry {
    tools: BTreeMap<String, Tool>,
    function_tools: BTreeMap<String, FunctionTool>,
    data_components: BTreeMap<String, DataComponent>,
    artifact_components: BTreeMap<String, ArtifactComponent>,
    credentials: BTreeMap<String, CredentialReference>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an MCP tool. Tool and function-tool ids share one namespace.
    pub fn register_tool(&mut self, tool: Tool) -> Result<(), ApiError> {
        self.ensure_tool_id_free(tool.id())?;
        self.tools.insert(tool.id().to_string(), tool);
        Ok(())
    }

    pub fn register_function_tool(&mut self, tool: FunctionTool) -> Result<(), ApiError> {
        self.ensure_tool_id_free(tool.id())?;
        self.function_tools.insert(tool.id().to_string(), tool);
        Ok(())
    }

    /// Register a data component; re-registering the same definition is a no-op.
    pub fn register_data_component(&mut self, component: DataComponent) -> Result<(), ApiError> {
        insert_unique(&mut self.data_components, "DataComponent", component.id().to_string(), component)
    }

    pub fn register_artifact_component(
        &mut self,
        component: ArtifactComponent,
    ) -> Result<(), ApiError> {
        insert_unique(
            &mut self.artifact_components,
            "ArtifactComponent",
            component.id().to_string(),
            component,
        )
    }

    pub fn register_credential(&mut self, credential: CredentialReference) -> Result<(), ApiError> {
        insert_unique(
            &mut self.credentials,
            "CredentialReference",
            credential.id().to_string(),
            credential,
        )
    }

    pub fn tool(&self, id: &str) -> Option<ToolRef<'_>> {
        if let Some(tool) = self.tools.get(id) {
            return Some(ToolRef::Mcp(tool));
        }
        self.function_tools.get(id).map(ToolRef::Function)
    }

    pub fn tool_or_error(&self, id: &str) -> Result<ToolRef<'_>, ApiError> {
        self.tool(id)
            .ok_or_else(|| ApiError::ConfigError(format!("Tool not registered: {}", id)))
    }

    pub fn data_component(&self, id: &str) -> Option<&DataComponent> {
        self.data_components.get(id)
    }

    pub fn artifact_component(&self, id: &str) -> Option<&ArtifactComponent> {
        self.artifact_components.get(id)
    }

    pub fn credential(&self, id: &str) -> Option<&CredentialReference> {
        self.credentials.get(id)
    }

    pub fn tools(&self) -> impl Iterator<Item = &Tool> {
        self.tools.values()
    }

    pub fn function_tools(&self) -> impl Iterator<Item = &FunctionTool> {
        self.function_tools.values()
    }

    fn ensure_tool_id_free(&self, id: &str) -> Result<(), ApiError> {
        if self.tools.contains_key(id) || self.function_tools.contains_key(id) {
            return Err(ApiError::ConfigError(format!(
                "Tool id already registered: {}",
                id
            )));
        }
        Ok(())
    }
}

fn insert_unique<T: PartialEq>(
    map: &mut BTreeMap<String, T>,
    kind: &str,
    id: String,
    value: T,
) -> Result<(), ApiError> {
    match map.get(&id) {
        Some(existing) if *existing == value => Ok(()),
        Some(_) => Err(ApiError::ConfigError(format!(
            "{} id '{}' is already registered with a different definition",
            kind, id
        ))),
        None => {
            map.insert(id, value);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::component::DataComponentConfig;
    use crate::entity::tool::FunctionToolConfig;

    #[test]
    fn tool_ids_share_a_namespace() {
        let mut registry = EntityRegistry::new();
        registry
            .register_tool(Tool::mcp("Calc", "https://calc.example.com").unwrap())
            .unwrap();
        let err = registry
            .register_function_tool(
                FunctionTool::new(FunctionToolConfig {
                    name: "calc".into(),
                    execute_code: "return 1".into(),
                    ..Default::default()
                })
                .unwrap(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("calc"));
    }

    #[test]
    fn identical_component_registration_is_idempotent() {
        let component = || {
            DataComponent::new(DataComponentConfig {
                name: "Order Summary".into(),
                ..Default::default()
            })
            .unwrap()
        };
        let mut registry = EntityRegistry::new();
        registry.register_data_component(component()).unwrap();
        registry.register_data_component(component()).unwrap();

        let mut conflicting = component();
        conflicting.description = "different".into();
        assert!(registry.register_data_component(conflicting).is_err());
    }

    #[test]
    fn unknown_tool_is_a_configuration_error() {
        let registry = EntityRegistry::new();
        assert!(matches!(
            registry.tool_or_error("missing"),
            Err(ApiError::ConfigError(_))
        ));
    }
}
