//! Core types shared across the entity model and the wire documents.

/// EntityId: caller-supplied or slug-derived identifier of a synchronized entity
pub type EntityId = String;

/// Effective `transferCountIs` when neither the graph nor its project sets one
pub const DEFAULT_TRANSFER_COUNT: u32 = 10;

/// Description emitted for agents that were declared without one
pub const DEFAULT_AGENT_DESCRIPTION: &str = "No description provided";
