//! Environment variable source: GRAPHSYNC__ prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

pub const ENV_PREFIX: &str = "GRAPHSYNC";

/// Add environment variable overlay to builder.
/// `GRAPHSYNC__REMOTE__TENANT_ID` sets `remote.tenant_id`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
