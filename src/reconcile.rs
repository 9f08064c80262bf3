//! Reconciliation Engine
//!
//! Pushes assembled definitions and relation edges to the control plane.
//! Entities are written with update-then-create upserts; relation edges are
//! created concurrently and tolerate partial failure.

pub mod defaults;
pub mod graph;
pub mod project;
pub mod relations;
pub mod tools;
pub mod upsert;

pub use defaults::RemoteProjectDefaults;
pub use graph::GraphSynchronizer;
pub use project::ProjectSynchronizer;
pub use relations::{enumerate_relations, reconcile_relations, RelationReport};
pub use tools::prepare_tools;
pub use upsert::{upsert, upsert_serialized};

use chrono::{DateTime, Utc};
use serde_json::Value;

/// `createdAt`/`updatedAt` from an upsert response payload.
pub(crate) fn remote_timestamps(
    data: Option<&Value>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let parse = |field: &str| {
        data.and_then(|d| d.get(field))
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
    };
    (parse("createdAt"), parse("updatedAt"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_rfc3339_timestamps() {
        let data = json!({"createdAt": "2026-01-02T03:04:05.000Z", "updatedAt": "garbage"});
        let (created, updated) = remote_timestamps(Some(&data));
        assert_eq!(
            created.map(|t| t.to_rfc3339()),
            Some("2026-01-02T03:04:05+00:00".to_string())
        );
        assert_eq!(updated, None);
        assert_eq!(remote_timestamps(None), (None, None));
    }
}
