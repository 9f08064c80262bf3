//! Entity Model
//!
//! Value objects for everything that is synchronized with the control plane:
//! projects, graphs, sub-agents, external agents, tools, function tools,
//! components and credential references. Entities are built in memory and
//! reference one another by id.

pub mod component;
pub mod graph;
pub mod identity;
pub mod models;
pub mod project;
pub mod registry;
pub mod sub_agent;
pub mod tool;

pub use component::{
    ArtifactComponent, ArtifactComponentConfig, CredentialReference, DataComponent,
    DataComponentConfig,
};
pub use graph::{Graph, GraphConfig, StatusUpdateSettings};
pub use identity::{derive_id, require_stable_id, slugify};
pub use models::{ModelKind, ModelSettings, ModelSlot, StopWhen};
pub use project::{Project, ProjectConfig, ProjectDefaults};
pub use registry::{EntityRegistry, ToolRef};
pub use sub_agent::{ExternalAgent, ExternalAgentConfig, SubAgent, SubAgentConfig, ToolUse};
pub use tool::{FunctionTool, FunctionToolConfig, Tool, ToolConfig, TransportKind};
