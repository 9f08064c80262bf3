//! Project assembly: every graph plus a deduplicated shared registry.

use super::graph::{format_timestamp, GraphAssembler};
use crate::definition::{FullGraphDefinition, FullProjectDefinition, ProjectMetadata};
use crate::entity::Project;
use crate::error::ApiError;
use std::collections::BTreeMap;
use tracing::warn;

pub struct ProjectAssembler;

impl ProjectAssembler {
    /// Metadata document used for the first, graph-less project upsert.
    pub fn metadata(project: &Project) -> ProjectMetadata {
        ProjectMetadata {
            id: project.id().to_string(),
            name: project.name().to_string(),
            description: project.description().map(str::to_string),
            models: Some(project.models().clone()).filter(|m| !m.is_empty()),
            stop_when: Some(*project.stop_when()).filter(|s| !s.is_empty()),
        }
    }

    pub fn assemble(project: &Project) -> Result<FullProjectDefinition, ApiError> {
        let graphs = project
            .graphs()
            .map(|graph| -> Result<_, ApiError> {
                Ok((graph.id().to_string(), GraphAssembler::assemble(graph)?))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let metadata = Self::metadata(project);
        let mut definition = FullProjectDefinition {
            id: metadata.id,
            name: metadata.name,
            description: metadata.description,
            models: metadata.models,
            stop_when: metadata.stop_when,
            graphs: BTreeMap::new(),
            tools: BTreeMap::new(),
            functions: BTreeMap::new(),
            data_components: BTreeMap::new(),
            artifact_components: BTreeMap::new(),
            credential_references: BTreeMap::new(),
            created_at: project.created_at().map(format_timestamp),
            updated_at: project.updated_at().map(format_timestamp),
        };
        for graph in graphs.values() {
            merge_registry(&mut definition, graph);
        }
        definition.graphs = graphs;
        Ok(definition)
    }
}

/// Fold one graph's referenced entities into the project registry. Graphs
/// are visited in id order and the first definition of an id wins.
fn merge_registry(project: &mut FullProjectDefinition, graph: &FullGraphDefinition) {
    merge_into(&mut project.tools, &graph.tools, "tool", &graph.id);
    merge_into(&mut project.functions, &graph.functions, "function", &graph.id);
    merge_into(
        &mut project.data_components,
        &graph.data_components,
        "data component",
        &graph.id,
    );
    merge_into(
        &mut project.artifact_components,
        &graph.artifact_components,
        "artifact component",
        &graph.id,
    );
    merge_into(
        &mut project.credential_references,
        &graph.credential_references,
        "credential reference",
        &graph.id,
    );
}

fn merge_into<T: Clone + PartialEq>(
    target: &mut BTreeMap<String, T>,
    source: &BTreeMap<String, T>,
    kind: &str,
    graph_id: &str,
) {
    for (id, definition) in source {
        match target.get(id) {
            None => {
                target.insert(id.clone(), definition.clone());
            }
            Some(existing) if existing != definition => {
                warn!(
                    graph_id,
                    kind,
                    id = id.as_str(),
                    "Conflicting definitions share an id; keeping the first"
                );
            }
            Some(_) => {}
        }
    }
}
