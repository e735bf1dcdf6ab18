//! Configuration management for plantmark.
//!
//! Parses `plantmark.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `plantuml.server_url`
//! - `plantuml.image_format`

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use plantmark_diagrams::RenderConfig;
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "plantmark.toml";

/// Image formats the diagram server is asked for.
const IMAGE_FORMATS: &[&str] = &["svg", "png", "txt"];

/// Upper bound for `plantuml.timeout_secs`.
const MAX_TIMEOUT_SECS: u64 = 600;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the enable flag.
    pub enable: Option<bool>,
    /// Override diagram server URL.
    pub server_url: Option<String>,
    /// Override requested image format.
    pub image_format: Option<String>,
    /// Override dark mode.
    pub dark: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diagram rendering configuration.
    pub plantuml: PlantUmlConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[plantuml]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlantUmlConfig {
    /// Whether diagram blocks are rendered by the server at all.
    pub enable: bool,
    /// Diagram server base URL (e.g. `https://www.plantuml.com/plantuml`).
    pub server_url: Option<String>,
    /// Requested image format path segment (`svg`, `png`, `txt`).
    pub image_format: String,
    /// Request dark-mode renderings (`/dsvg/...`).
    pub dark: bool,
    /// HTTP timeout for a single diagram request, in seconds.
    pub timeout_secs: u64,
}

impl Default for PlantUmlConfig {
    fn default() -> Self {
        Self {
            enable: true,
            server_url: None,
            image_format: "svg".to_owned(),
            dark: false,
            timeout_secs: 30,
        }
    }
}

impl PlantUmlConfig {
    /// Build the read-only settings consumed by the diagram fetcher.
    #[must_use]
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            enabled: self.enable,
            server_url: self.server_url.clone(),
            image_format: self.image_format.clone(),
            dark: self.dark,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`plantuml.server_url`").
        field: String,
        /// Error message (e.g., "${`PLANTUML_SERVER`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `plantmark.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading and take precedence over file values.
    /// The merged result is validated once more so a bad override is reported too.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Settings for the diagram fetcher.
    #[must_use]
    pub fn render_config(&self) -> RenderConfig {
        self.plantuml.render_config()
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(enable) = settings.enable {
            self.plantuml.enable = enable;
        }
        if let Some(server_url) = &settings.server_url {
            self.plantuml.server_url = Some(server_url.clone());
        }
        if let Some(image_format) = &settings.image_format {
            self.plantuml.image_format.clone_from(image_format);
        }
        if let Some(dark) = settings.dark {
            self.plantuml.dark = dark;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let plantuml = &self.plantuml;

        // The URL only matters when rendering is on
        if plantuml.enable
            && let Some(ref url) = plantuml.server_url
        {
            require_non_empty(url, "plantuml.server_url")?;
            require_http_url(url, "plantuml.server_url")?;
        }

        if !IMAGE_FORMATS.contains(&plantuml.image_format.as_str()) {
            return Err(ConfigError::Validation(format!(
                "plantuml.image_format must be one of {}, got '{}'",
                IMAGE_FORMATS.join(", "),
                plantuml.image_format
            )));
        }

        if plantuml.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "plantuml.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if plantuml.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "plantuml.timeout_secs cannot exceed {MAX_TIMEOUT_SECS}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.plantuml.server_url {
            self.plantuml.server_url = Some(expand::expand_env(url, "plantuml.server_url")?);
        }
        self.plantuml.image_format =
            expand::expand_env(&self.plantuml.image_format, "plantuml.image_format")?;
        Ok(())
    }
}
