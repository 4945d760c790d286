//! Command handlers for lambda-phage.

pub mod init;
pub mod project;

// Re-export command types for convenience
pub use init::InitCommand;
pub use project::ProjectCommand;

use phage_core::{AppResult, AppSettings};
use phage_model::FunctionConfig;
use std::path::PathBuf;

/// Absolute path of the function config file for this invocation.
///
/// Projects store this path, so it must not depend on the directory a
/// later deploy runs from.
pub fn config_path(settings: &AppSettings) -> AppResult<PathBuf> {
    if settings.config_file.is_absolute() {
        Ok(settings.config_file.clone())
    } else {
        Ok(std::env::current_dir()?.join(&settings.config_file))
    }
}

/// Load the current directory's function config, if there is one.
pub fn load_current_config(settings: &AppSettings) -> AppResult<Option<FunctionConfig>> {
    let path = config_path(settings)?;
    let config = FunctionConfig::load_optional(&path)?;
    tracing::debug!("Current function config {:?}: {}", path, config.is_some());
    Ok(config)
}
