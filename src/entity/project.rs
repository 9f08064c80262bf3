//! Projects: the top inheritance scope, owning a set of graphs.

use super::graph::Graph;
use super::identity::require_stable_id;
use super::models::{ModelSettings, StopWhen};
use crate::error::ApiError;
use crate::types::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{btree_map, BTreeMap};

/// Settings a project hands down to its graphs and their agents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDefaults {
    #[serde(default)]
    pub models: ModelSettings,
    #[serde(default)]
    pub stop_when: StopWhen,
}

/// Declaration of a project. `id` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub models: ModelSettings,
    #[serde(default)]
    pub stop_when: StopWhen,
}

#[derive(Debug, Clone)]
pub struct Project {
    id: EntityId,
    name: String,
    description: Option<String>,
    models: ModelSettings,
    stop_when: StopWhen,
    graphs: BTreeMap<EntityId, Graph>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    initialized: bool,
}

impl Project {
    pub fn new(config: ProjectConfig) -> Result<Self, ApiError> {
        let id = require_stable_id("Project", config.id.as_deref())?;
        Ok(Self {
            id,
            name: config.name,
            description: config.description,
            models: config.models,
            stop_when: config.stop_when,
            graphs: BTreeMap::new(),
            created_at: None,
            updated_at: None,
            initialized: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn models(&self) -> &ModelSettings {
        &self.models
    }

    pub fn stop_when(&self) -> &StopWhen {
        &self.stop_when
    }

    pub fn defaults(&self) -> ProjectDefaults {
        ProjectDefaults {
            models: self.models.clone(),
            stop_when: self.stop_when,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn graph(&self, id: &str) -> Option<&Graph> {
        self.graphs.get(id)
    }

    /// Graphs in id order.
    pub fn graphs(&self) -> impl Iterator<Item = &Graph> {
        self.graphs.values()
    }

    pub fn add_graph(&mut self, graph: Graph) -> Result<(), ApiError> {
        self.ensure_mutable()?;
        if self.graphs.contains_key(graph.id()) {
            return Err(ApiError::ConfigError(format!(
                "Graph id '{}' is already used in project '{}'",
                graph.id(),
                self.id
            )));
        }
        self.graphs.insert(graph.id().to_string(), graph);
        Ok(())
    }

    pub fn with_graph(mut self, graph: Graph) -> Result<Self, ApiError> {
        self.add_graph(graph)?;
        Ok(self)
    }

    pub fn set_models(&mut self, models: ModelSettings) -> Result<(), ApiError> {
        self.ensure_mutable()?;
        self.models = models;
        Ok(())
    }

    pub fn set_stop_when(&mut self, stop_when: StopWhen) -> Result<(), ApiError> {
        self.ensure_mutable()?;
        self.stop_when = stop_when;
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<(), ApiError> {
        if self.initialized {
            return Err(ApiError::ConfigError(format!(
                "Project '{}' is already initialized; configuration is frozen",
                self.id
            )));
        }
        Ok(())
    }

    pub(crate) fn graphs_mut(&mut self) -> btree_map::ValuesMut<'_, EntityId, Graph> {
        self.graphs.values_mut()
    }

    pub(crate) fn record_timestamps(
        &mut self,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) {
        if created_at.is_some() {
            self.created_at = created_at;
        }
        if updated_at.is_some() {
            self.updated_at = updated_at;
        }
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
    }
}
