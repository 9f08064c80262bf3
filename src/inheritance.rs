//! Inheritance Resolution
//!
//! Field-level propagation of model settings and stop conditions from a
//! project to a graph and from the graph to its sub-agents. A value already
//! present at a lower scope is never overwritten, and every slot is inherited
//! independently. Every step is a presence check, so resolving twice is a no-op.

use crate::entity::{Graph, ModelKind, ProjectDefaults};
use crate::error::ApiError;
use crate::types::DEFAULT_TRANSFER_COUNT;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Source of the defaults a graph inherits from its project.
#[async_trait]
pub trait ProjectDefaultsSource: Send + Sync {
    /// Returns `Ok(None)` when the project is known to have no defaults.
    async fn project_defaults(&self) -> Result<Option<ProjectDefaults>, ApiError>;
}

#[async_trait]
impl ProjectDefaultsSource for ProjectDefaults {
    async fn project_defaults(&self) -> Result<Option<ProjectDefaults>, ApiError> {
        Ok(Some(self.clone()))
    }
}

/// Where the effective `transferCountIs` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferCountOrigin {
    Graph,
    Project,
    Default,
}

/// What one resolution pass changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritanceReport {
    pub graph_slots: Vec<ModelKind>,
    pub transfer_count: TransferCountOrigin,
    pub agent_slots_filled: usize,
    pub agent_step_counts_filled: usize,
}

impl InheritanceReport {
    /// True when the pass changed nothing.
    pub fn is_noop(&self) -> bool {
        self.graph_slots.is_empty()
            && self.transfer_count == TransferCountOrigin::Graph
            && self.agent_slots_filled == 0
            && self.agent_step_counts_filled == 0
    }
}

pub struct InheritanceResolver;

impl InheritanceResolver {
    /// Fetch project defaults from `source` and resolve `graph` against them.
    ///
    /// A failed lookup degrades to resolving without project defaults.
    pub async fn resolve_from(
        graph: &mut Graph,
        source: &dyn ProjectDefaultsSource,
    ) -> InheritanceReport {
        let defaults = match source.project_defaults().await {
            Ok(defaults) => defaults,
            Err(e) => {
                warn!(
                    graph_id = graph.id(),
                    error = %e,
                    "Project defaults lookup failed; resolving without inheritance"
                );
                None
            }
        };
        Self::resolve(graph, defaults.as_ref())
    }

    /// Annotate `graph` and its sub-agents with effective settings.
    pub fn resolve(graph: &mut Graph, defaults: Option<&ProjectDefaults>) -> InheritanceReport {
        let graph_id = graph.id().to_string();
        let (models, stop_when, agents) = graph.effective_parts_mut();

        let graph_slots = match defaults {
            Some(defaults) => models.inherit_from(&defaults.models),
            None => Vec::new(),
        };

        let transfer_count = if stop_when.transfer_count_is.is_some() {
            TransferCountOrigin::Graph
        } else if let Some(count) = defaults.and_then(|d| d.stop_when.transfer_count_is) {
            stop_when.transfer_count_is = Some(count);
            TransferCountOrigin::Project
        } else {
            stop_when.transfer_count_is = Some(DEFAULT_TRANSFER_COUNT);
            TransferCountOrigin::Default
        };

        let project_step_count = defaults.and_then(|d| d.stop_when.step_count_is);
        let mut agent_slots_filled = 0;
        let mut agent_step_counts_filled = 0;
        for agent in agents {
            let filled = agent.models.inherit_from(models);
            if !filled.is_empty() {
                debug!(
                    graph_id = %graph_id,
                    agent_id = agent.id(),
                    slots = ?filled.iter().map(ModelKind::as_str).collect::<Vec<_>>(),
                    "Agent inherited model slots"
                );
            }
            agent_slots_filled += filled.len();

            if agent.stop_when.step_count_is.is_none() {
                if let Some(steps) = project_step_count {
                    agent.stop_when.step_count_is = Some(steps);
                    agent_step_counts_filled += 1;
                }
            }
        }

        let report = InheritanceReport {
            graph_slots,
            transfer_count,
            agent_slots_filled,
            agent_step_counts_filled,
        };
        debug!(graph_id = %graph_id, report = ?report, "Inheritance resolved");
        report
    }
}
