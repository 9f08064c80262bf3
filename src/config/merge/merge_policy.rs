//! Base layer: built-in defaults every other source overrides.

use crate::config::{DEFAULT_API_URL, DEFAULT_TENANT_ID, DEFAULT_TIMEOUT_SECS};
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("remote.api_url", DEFAULT_API_URL)?
        .set_default("remote.tenant_id", DEFAULT_TENANT_ID)?
        .set_default("remote.timeout_secs", DEFAULT_TIMEOUT_SECS)
}
