//! graphsync: Graph Assembly & Inheritance Resolution
//!
//! Builds agent graphs in memory, resolves model and stop-condition
//! inheritance from project to graph to agent, assembles canonical
//! definition documents, and reconciles them with a remote control plane.

pub mod assembly;
pub mod config;
pub mod definition;
pub mod entity;
pub mod error;
pub mod inheritance;
pub mod logging;
pub mod reconcile;
pub mod remote;
pub mod tooling;
pub mod types;

pub use assembly::{GraphAssembler, ProjectAssembler};
pub use error::ApiError;
pub use inheritance::{InheritanceReport, InheritanceResolver, ProjectDefaultsSource};
pub use reconcile::{GraphSynchronizer, ProjectSynchronizer};
pub use remote::{ControlPlane, HttpControlPlane, InMemoryControlPlane};
