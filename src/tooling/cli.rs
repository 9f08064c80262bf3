//! CLI Tooling
//!
//! Pushes canonical graph and project documents to the control plane and
//! inspects documents and configuration locally.

use crate::config::{ConfigLoader, SyncConfig};
use crate::definition::{load_document, FullGraphDefinition, FullProjectDefinition};
use crate::error::ApiError;
use crate::reconcile::ProjectSynchronizer;
use crate::remote::{ControlPlane, HttpControlPlane, InMemoryControlPlane};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// graphsync - synchronize agent graphs with a control plane
#[derive(Parser)]
#[command(name = "graphsync")]
#[command(about = "Synchronize agent graph and project definitions with a control plane")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Send requests to an in-memory control plane instead of the network
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Fold logging flags into the loaded configuration.
    pub fn apply_logging_overrides(&self, config: &mut SyncConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upsert a full project definition
    PushProject {
        /// Project document (JSON, YAML or TOML)
        file: PathBuf,
    },
    /// Upsert a full graph definition into a project
    PushGraph {
        /// Graph document (JSON, YAML or TOML)
        file: PathBuf,
        /// Owning project id
        #[arg(long)]
        project: String,
    },
    /// Print the fingerprint of a definition document
    Fingerprint {
        file: PathBuf,
        /// Treat the document as a graph definition
        #[arg(long)]
        graph: bool,
    },
    /// Print the effective configuration
    Config,
}

/// Loaded configuration plus the control plane commands talk to.
pub struct CliContext {
    config: SyncConfig,
    plane: Arc<dyn ControlPlane>,
}

impl CliContext {
    /// Load configuration for `workspace_root`, or from `config_path` when given.
    pub fn load_config(
        workspace_root: &Path,
        config_path: Option<&Path>,
    ) -> Result<SyncConfig, ApiError> {
        match config_path {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(workspace_root),
        }
    }

    pub fn new(config: SyncConfig, dry_run: bool) -> Result<Self, ApiError> {
        let plane: Arc<dyn ControlPlane> = if dry_run {
            Arc::new(InMemoryControlPlane::new())
        } else {
            Arc::new(HttpControlPlane::new(&config.remote)?)
        };
        Ok(Self::with_plane(config, plane))
    }

    pub fn with_plane(config: SyncConfig, plane: Arc<dyn ControlPlane>) -> Self {
        Self { config, plane }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn synchronizer(&self) -> ProjectSynchronizer {
        ProjectSynchronizer::new(self.plane.clone(), self.config.remote.tenant_id.clone())
    }

    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::PushProject { file } => {
                let definition: FullProjectDefinition = load_document(file)?;
                let fingerprint = definition.fingerprint()?;
                self.synchronizer().push_definition(&definition).await?;
                info!(project_id = %definition.id, "Pushed project definition");
                Ok(format!(
                    "Pushed project '{}' ({} graphs, fingerprint {})",
                    definition.id,
                    definition.graphs.len(),
                    fingerprint
                ))
            }
            Commands::PushGraph { file, project } => {
                let definition: FullGraphDefinition = load_document(file)?;
                let fingerprint = definition.fingerprint()?;
                self.synchronizer()
                    .graphs(project)
                    .push_definition(&definition)
                    .await?;
                info!(graph_id = %definition.id, project_id = %project, "Pushed graph definition");
                Ok(format!(
                    "Pushed graph '{}' to project '{}' ({} agents, fingerprint {})",
                    definition.id,
                    project,
                    definition.agents.len(),
                    fingerprint
                ))
            }
            Commands::Fingerprint { file, graph } => {
                if *graph {
                    load_document::<FullGraphDefinition>(file)?.fingerprint()
                } else {
                    load_document::<FullProjectDefinition>(file)?.fingerprint()
                }
            }
            Commands::Config => {
                let mut value = serde_json::to_value(&self.config)?;
                if self.config.remote.api_key.is_some() {
                    value["remote"]["api_key"] = json!("<redacted>");
                }
                Ok(serde_json::to_string_pretty(&value)?)
            }
        }
    }
}
