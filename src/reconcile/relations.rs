//! Relation edges between agents.

use crate::entity::Graph;
use crate::error::ApiError;
use crate::remote::{ControlPlane, RelationRequest, RelationType, Scope};
use futures::future::join_all;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Outcome counts of one relation batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationReport {
    pub created: usize,
    pub existing: usize,
    pub failed: usize,
}

impl RelationReport {
    pub fn total(&self) -> usize {
        self.created + self.existing + self.failed
    }
}

enum RelationOutcome {
    Created,
    AlreadyExists,
    Failed(String),
}

/// Every transfer and delegate edge declared by the graph's internal agents,
/// without repeats, in agent-id order.
///
/// Transfer targets are always internal. Delegate targets resolve to the
/// internal or external agent registered under the id.
pub fn enumerate_relations(graph: &Graph) -> Vec<RelationRequest> {
    let mut seen = BTreeSet::new();
    let mut edges = Vec::new();
    for agent in graph.sub_agents() {
        let transfers = agent
            .can_transfer_to
            .iter()
            .map(|target| (target, RelationType::Transfer));
        let delegates = agent
            .can_delegate_to
            .iter()
            .map(|target| (target, RelationType::Delegate));

        for (target, relation_type) in transfers.chain(delegates) {
            if !seen.insert((agent.id(), target.as_str(), relation_type)) {
                continue;
            }
            let external = relation_type == RelationType::Delegate
                && graph.sub_agent(target).is_none()
                && graph.external_agent(target).is_some();
            edges.push(RelationRequest {
                graph_id: graph.id().to_string(),
                source_agent_id: agent.id().to_string(),
                target_agent_id: (!external).then(|| target.clone()),
                external_agent_id: external.then(|| target.clone()),
                relation_type,
            });
        }
    }
    edges
}

/// Create every edge concurrently and wait for all outcomes.
///
/// Duplicates count as success. Individual failures are logged and
/// tolerated as long as at least one edge succeeds; if every edge fails the
/// batch fails with the failure count.
pub async fn reconcile_relations(
    plane: &dyn ControlPlane,
    scope: &Scope,
    graph_id: &str,
    edges: &[RelationRequest],
) -> Result<RelationReport, ApiError> {
    if edges.is_empty() {
        debug!(graph_id, "No relations to reconcile");
        return Ok(RelationReport::default());
    }

    let outcomes = join_all(edges.iter().map(|edge| async move {
        match plane.create_relation(scope, edge).await {
            Ok(response) if response.is_success() => RelationOutcome::Created,
            Ok(response) if response.is_duplicate() => RelationOutcome::AlreadyExists,
            Ok(response) => RelationOutcome::Failed(format!(
                "HTTP {}: {}",
                response.status,
                response.error_message()
            )),
            Err(e) => RelationOutcome::Failed(e.to_string()),
        }
    }))
    .await;

    let mut report = RelationReport::default();
    for (edge, outcome) in edges.iter().zip(outcomes) {
        match outcome {
            RelationOutcome::Created => report.created += 1,
            RelationOutcome::AlreadyExists => {
                debug!(graph_id, edge = %edge.edge_key(), "Relation already exists");
                report.existing += 1;
            }
            RelationOutcome::Failed(reason) => {
                warn!(
                    graph_id,
                    source_agent_id = %edge.source_agent_id,
                    target_agent_id = edge.target_id(),
                    relation_type = edge.relation_type.as_str(),
                    error = %reason,
                    "Relation creation failed"
                );
                report.failed += 1;
            }
        }
    }

    if report.failed == edges.len() {
        return Err(ApiError::AggregateRelationFailure {
            graph_id: graph_id.to_string(),
            failed: report.failed,
        });
    }
    if report.failed > 0 {
        warn!(
            graph_id,
            failed = report.failed,
            total = report.total(),
            "Relations partially reconciled"
        );
    } else {
        info!(
            graph_id,
            created = report.created,
            existing = report.existing,
            "Relations reconciled"
        );
    }
    Ok(report)
}
