//! ConfigLoader facade delegating to the merge service.

use super::merge::service::MergeService;
use super::SyncConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the standard sources for a workspace.
    pub fn load(workspace_root: &Path) -> Result<SyncConfig, ApiError> {
        let config = MergeService::load(workspace_root)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<SyncConfig, ApiError> {
        let config = MergeService::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default() -> SyncConfig {
        SyncConfig::default()
    }
}
