//! Application settings for lambda-phage.
//!
//! Settings are merged from several sources, later ones winning:
//! - Built-in defaults
//! - Environment variables
//! - The settings file (`<home>/.lambda_phage/settings.yaml`)
//! - Command-line flags
//!
//! These are settings for the tool itself. A function's deployment
//! configuration lives in `phage_model::FunctionConfig`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Name of the per-user state directory inside `home`.
pub const STATE_DIR: &str = ".lambda_phage";

/// Default function config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "l-p.yml";

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Directory holding `.lambda_phage/` (usually the user's home)
    pub home: PathBuf,

    /// Function config file for the current directory
    pub config_file: PathBuf,

    /// Deploy provider identifier (e.g., "http")
    pub provider: String,

    /// Base URL of the function-execution service
    pub endpoint: String,

    /// Per-request timeout for the deploy collaborator, in seconds
    pub timeout_secs: u64,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Structure of the optional settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SettingsFile {
    deploy: Option<DeploySettings>,
    logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DeploySettings {
    provider: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSettings {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            home: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            provider: "http".to_string(),
            endpoint: "http://127.0.0.1:3000".to_string(),
            timeout_secs: 120,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppSettings {
    /// Load settings from environment variables, the settings file and
    /// defaults.
    ///
    /// Environment variables:
    /// - `PHAGE_HOME`: Override the home directory
    /// - `PHAGE_CONFIG`: Function config file
    /// - `PHAGE_PROVIDER`: Deploy provider
    /// - `PHAGE_ENDPOINT`: Service endpoint
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// `home` (from `--home`) takes precedence over `PHAGE_HOME` and is
    /// resolved first, so its settings file is the one read.
    pub fn load(home: Option<PathBuf>) -> AppResult<Self> {
        let mut settings = Self::default();

        if let Some(home) = home.or_else(|| std::env::var_os("PHAGE_HOME").map(PathBuf::from)) {
            settings.home = home;
        }

        if let Ok(config_file) = std::env::var("PHAGE_CONFIG") {
            settings.config_file = PathBuf::from(config_file);
        }

        if !settings.home.exists() {
            return Err(AppError::Config(format!(
                "Home directory does not exist: {:?}",
                settings.home
            )));
        }

        let settings_path = settings.settings_file();
        if settings_path.exists() {
            settings = settings.merge_yaml(&settings_path)?;
        }

        // Environment variables override the settings file
        if let Ok(provider) = std::env::var("PHAGE_PROVIDER") {
            settings.provider = provider;
        }

        if let Ok(endpoint) = std::env::var("PHAGE_ENDPOINT") {
            settings.endpoint = endpoint;
        }

        settings.log_level = settings.log_level.or_else(|| std::env::var("RUST_LOG").ok());

        if std::env::var("NO_COLOR").is_ok() {
            settings.no_color = true;
        }

        Ok(settings)
    }

    /// Merge a YAML settings file into these settings.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read settings file {:?}: {}", path, e))
        })?;

        let file: SettingsFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse settings file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(deploy) = file.deploy {
            if let Some(provider) = deploy.provider {
                result.provider = provider;
            }
            if let Some(endpoint) = deploy.endpoint {
                result.endpoint = endpoint;
            }
            if let Some(timeout) = deploy.timeout_secs {
                result.timeout_secs = timeout;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides, giving flags precedence over everything else.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        home: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        endpoint: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(home) = home {
            self.home = home;
        }

        if let Some(config_file) = config_file {
            self.config_file = config_file;
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Path to the per-user state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.home.join(STATE_DIR)
    }

    /// Path to the optional settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.state_dir().join("settings.yaml")
    }

    /// Validate settings before any command runs.
    pub fn validate(&self) -> AppResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(AppError::Config("Endpoint cannot be empty".to_string()));
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(AppError::Config(format!(
                "Endpoint must be an http(s) URL: {}",
                self.endpoint
            )));
        }

        if self.timeout_secs == 0 {
            return Err(AppError::Config(
                "Deploy timeout must be at least one second".to_string(),
            ));
        }

        Ok(())
    }
}
