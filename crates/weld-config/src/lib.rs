//! `weld.toml` loading for the weld proxy.
//!
//! A config file is found by walking up from the working directory, parsed
//! with serde, then overridden by [`CliSettings`] and validated.
//!
//! ## Variables
//!
//! These fields accept `${VAR}` (required) and `${VAR:-fallback}`:
//! - `server.host`
//! - `resolver.templates_dir`
//! - `resolver.widget_attribute`
//! - `resolver.diagnostics_key`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Command-line overrides applied on top of the loaded file.
///
/// `None` leaves the file (or default) value in place.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override template directory.
    pub templates_dir: Option<PathBuf>,
    /// Override built-in widget registration.
    pub builtin_widgets: Option<bool>,
}

/// Name of the file looked up by discovery.
const CONFIG_FILENAME: &str = "weld.toml";

/// Default template directory name, relative to the config file.
const DEFAULT_TEMPLATES_DIR: &str = "resolvers";

/// Endpoint reserved for health checks.
const HEALTH_ENDPOINT: &str = "/health";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Resolver configuration (paths are relative strings from TOML).
    resolver: ResolverConfigRaw,

    /// Resolved resolver configuration (set after loading).
    #[serde(skip)]
    pub resolver_resolved: ResolverConfig,
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Route accepting raw HTML.
    pub html_endpoint: String,
    /// Route accepting JSON payloads.
    pub payload_endpoint: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
            html_endpoint: "/resolve-html".to_owned(),
            payload_endpoint: "/resolve".to_owned(),
        }
    }
}

/// Handling of widgets with neither controller nor template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownElement {
    /// Replace with an HTML comment naming the element.
    #[default]
    Comment,
    /// Leave the element untouched.
    Keep,
    /// Delete the element.
    Remove,
}

/// Raw resolver configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ResolverConfigRaw {
    templates_dir: Option<String>,
    widget_attribute: Option<String>,
    unknown_element: Option<UnknownElement>,
    diagnostics_key: Option<String>,
    property_paths: Option<Vec<String>>,
    builtin_widgets: Option<bool>,
}

/// Resolved resolver configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Directory of `<name>/<name>[.<lang>].jinja` templates.
    ///
    /// `None` when the default directory does not exist.
    pub templates_dir: Option<PathBuf>,
    /// Attribute marking an element as a widget.
    pub widget_attribute: String,
    /// Handling of unknown widgets.
    pub unknown_element: UnknownElement,
    /// Key under which payload responses carry diagnostics.
    pub diagnostics_key: String,
    /// Payload property paths to resolve (empty means all).
    pub property_paths: Vec<String>,
    /// Whether the built-in widgets are registered.
    pub builtin_widgets: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            templates_dir: None,
            widget_attribute: "data-widget-type".to_owned(),
            unknown_element: UnknownElement::default(),
            diagnostics_key: "_diagnostics".to_owned(),
            property_paths: Vec::new(),
            builtin_widgets: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Config file not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error reading config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable expansion error.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field being expanded.
        field: String,
        /// Failure description.
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_route(value: &str, field: &str) -> Result<(), ConfigError> {
    if !value.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "{field} must start with /"
        )));
    }
    if value == HEALTH_ENDPOINT {
        return Err(ConfigError::Validation(format!(
            "{field} cannot be {HEALTH_ENDPOINT}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load `config_path`, or the discovered `weld.toml`, or defaults.
    ///
    /// Discovery walks from the working directory up to the filesystem root.
    /// CLI overrides are applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit path does not exist, the file cannot
    /// be read or parsed, an environment variable is missing, or validation
    /// fails.
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
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(templates_dir) = &settings.templates_dir {
            self.resolver_resolved.templates_dir = Some(templates_dir.clone());
        }
        if let Some(builtin_widgets) = settings.builtin_widgets {
            self.resolver_resolved.builtin_widgets = builtin_widgets;
        }
    }

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

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        let templates_dir = base.join(DEFAULT_TEMPLATES_DIR);
        Self {
            server: ServerConfig::default(),
            resolver: ResolverConfigRaw::default(),
            resolver_resolved: ResolverConfig {
                templates_dir: templates_dir.is_dir().then_some(templates_dir),
                ..ResolverConfig::default()
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Relative paths may come from variables, so expand first.
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Check ranges, routes and resolver settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_resolver()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // An OS-assigned port is never wanted for a configured proxy.
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        require_route(&self.server.html_endpoint, "server.html_endpoint")?;
        require_route(&self.server.payload_endpoint, "server.payload_endpoint")?;
        if self.server.html_endpoint == self.server.payload_endpoint {
            return Err(ConfigError::Validation(
                "server.html_endpoint and server.payload_endpoint must differ".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_resolver(&self) -> Result<(), ConfigError> {
        let resolver = &self.resolver_resolved;
        require_non_empty(&resolver.widget_attribute, "resolver.widget_attribute")?;
        if resolver.widget_attribute.contains(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "resolver.widget_attribute cannot contain whitespace".to_owned(),
            ));
        }
        require_non_empty(&resolver.diagnostics_key, "resolver.diagnostics_key")?;
        if resolver.property_paths.iter().any(|p| p.trim_matches('/').is_empty()) {
            return Err(ConfigError::Validation(
                "resolver.property_paths cannot contain empty paths".to_owned(),
            ));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        let resolver = &mut self.resolver;
        if let Some(ref dir) = resolver.templates_dir {
            resolver.templates_dir = Some(expand::expand_env(dir, "resolver.templates_dir")?);
        }
        if let Some(ref attribute) = resolver.widget_attribute {
            resolver.widget_attribute =
                Some(expand::expand_env(attribute, "resolver.widget_attribute")?);
        }
        if let Some(ref key) = resolver.diagnostics_key {
            resolver.diagnostics_key = Some(expand::expand_env(key, "resolver.diagnostics_key")?);
        }

        Ok(())
    }

    fn resolve_paths(&mut self, config_dir: &Path) {
        let raw = &self.resolver;
        let defaults = ResolverConfig::default();

        // An explicit directory is kept even if missing so the error surfaces
        // when templates are indexed.
        let templates_dir = match &raw.templates_dir {
            Some(dir) => Some(config_dir.join(dir)),
            None => Some(config_dir.join(DEFAULT_TEMPLATES_DIR)).filter(|dir| dir.is_dir()),
        };

        self.resolver_resolved = ResolverConfig {
            templates_dir,
            widget_attribute: raw
                .widget_attribute
                .clone()
                .unwrap_or(defaults.widget_attribute),
            unknown_element: raw.unknown_element.unwrap_or_default(),
            diagnostics_key: raw
                .diagnostics_key
                .clone()
                .unwrap_or(defaults.diagnostics_key),
            property_paths: raw.property_paths.clone().unwrap_or_default(),
            builtin_widgets: raw.builtin_widgets.unwrap_or(defaults.builtin_widgets),
        };
    }
}
