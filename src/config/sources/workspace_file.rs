//! Workspace file source: `<workspace>/graphsync.toml`, optional.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::Path;

pub const WORKSPACE_CONFIG_FILE: &str = "graphsync.toml";

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = workspace_root.join(WORKSPACE_CONFIG_FILE);
    Ok(builder.add_source(File::from(path).required(false)))
}
