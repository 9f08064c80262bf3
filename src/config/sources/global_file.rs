//! Global file source: `$XDG_CONFIG_HOME/graphsync/config.toml`, optional.

use crate::config::paths::xdg_root;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match xdg_root::global_config_file() {
        Ok(path) => Ok(builder.add_source(File::from(path).required(false))),
        Err(_) => Ok(builder),
    }
}
