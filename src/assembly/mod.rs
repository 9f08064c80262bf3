//! Assembly of canonical definition documents from entity state.

pub mod graph;
pub mod project;

pub use graph::GraphAssembler;
pub use project::ProjectAssembler;
