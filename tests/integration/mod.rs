//! Integration tests for graph synchronization against the in-memory control plane

mod graph_sync;
mod project_sync;
mod relations;
mod support;
mod upsert;
