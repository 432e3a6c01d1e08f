//! Configuration loading, validation, and management for Parley.
//!
//! Loads configuration from `~/.parley/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use parley_core::identity::DEFAULT_PREFIX;
use parley_core::service::{
    ANSWER_FIELDS, DEFAULT_ERROR_TEMPLATE, PLACEHOLDER_ANSWER, ResponseContract,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.parley/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// First endpoint tried for every question
    #[serde(default = "default_primary")]
    pub primary: EndpointConfig,

    /// Endpoint tried once when the primary attempt fails
    #[serde(default = "default_fallback")]
    pub fallback: EndpointConfig,

    /// Wire contract with the answering service
    #[serde(default)]
    pub service: ServiceConfig,

    /// Widget behavior
    #[serde(default)]
    pub widget: WidgetConfig,
}

/// One answering endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL; the query and health paths are appended to it
    pub url: String,

    /// Deadline for one attempt. Absent = transport default (no deadline).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl EndpointConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_primary() -> EndpointConfig {
    EndpointConfig {
        url: "http://localhost:8000".into(),
        timeout_secs: Some(default_primary_timeout_secs()),
    }
}
fn default_fallback() -> EndpointConfig {
    EndpointConfig {
        url: "https://healthassistant.vaardesigns.com".into(),
        timeout_secs: None,
    }
}
fn default_primary_timeout_secs() -> u64 {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_query_path")]
    pub query_path: String,

    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// Response keys that may carry the answer, highest priority first
    #[serde(default = "default_answer_fields")]
    pub answer_fields: Vec<String>,

    /// Answer shown when a response carries none of `answer_fields`
    #[serde(default = "default_placeholder_answer")]
    pub placeholder_answer: String,
}

fn default_query_path() -> String {
    "/query".into()
}
fn default_health_path() -> String {
    "/health".into()
}
fn default_answer_fields() -> Vec<String> {
    ANSWER_FIELDS.iter().map(|f| (*f).to_string()).collect()
}
fn default_placeholder_answer() -> String {
    PLACEHOLDER_ANSWER.into()
}

impl ServiceConfig {
    /// The response contract described by this section.
    pub fn contract(&self) -> ResponseContract {
        ResponseContract::new(self.answer_fields.clone(), self.placeholder_answer.clone())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            query_path: default_query_path(),
            health_path: default_health_path(),
            answer_fields: default_answer_fields(),
            placeholder_answer: default_placeholder_answer(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Prefix of generated conversation ids
    #[serde(default = "default_conversation_prefix")]
    pub conversation_prefix: String,

    /// Text of the error message; `{error}` is replaced by the failure
    #[serde(default = "default_error_template")]
    pub error_template: String,

    /// Whether the transcript panel starts visible
    #[serde(default)]
    pub start_open: bool,
}

fn default_conversation_prefix() -> String {
    DEFAULT_PREFIX.into()
}
fn default_error_template() -> String {
    DEFAULT_ERROR_TEMPLATE.into()
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            conversation_prefix: default_conversation_prefix(),
            error_template: default_error_template(),
            start_open: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.parley/config.toml).
    ///
    /// Environment variables override the file:
    /// - `PARLEY_PRIMARY_URL`
    /// - `PARLEY_FALLBACK_URL`
    /// - `PARLEY_PRIMARY_TIMEOUT_SECS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production, a map in tests).
    fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("PARLEY_PRIMARY_URL") {
            self.primary.url = url;
        }

        if let Some(url) = lookup("PARLEY_FALLBACK_URL") {
            self.fallback.url = url;
        }

        if let Some(raw) = lookup("PARLEY_PRIMARY_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "PARLEY_PRIMARY_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'"
                ))
            })?;
            self.primary.timeout_secs = Some(secs);
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".parley")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (label, endpoint) in [("primary", &self.primary), ("fallback", &self.fallback)] {
            let url = endpoint.url.trim();
            if url.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{label}.url must not be empty"
                )));
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationError(format!(
                    "{label}.url must start with http:// or https://, got '{url}'"
                )));
            }
            if endpoint.timeout_secs == Some(0) {
                return Err(ConfigError::ValidationError(format!(
                    "{label}.timeout_secs must be > 0"
                )));
            }
        }

        if self.service.answer_fields.is_empty() {
            return Err(ConfigError::ValidationError(
                "service.answer_fields must name at least one field".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `config` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            fallback: default_fallback(),
            service: ServiceConfig::default(),
            widget: WidgetConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for parley_core::Error {
    fn from(e: ConfigError) -> Self {
        parley_core::Error::Config {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.primary.timeout(), Some(Duration::from_secs(50)));
        assert_eq!(config.fallback.timeout(), None);
        assert_ne!(config.primary.url, config.fallback.url);
        assert_eq!(config.service.answer_fields, ["response", "answer", "message"]);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.primary, config.primary);
        assert_eq!(parsed.fallback, config.fallback);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.primary.url, "http://localhost:8000");
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[primary]
url = "http://10.0.0.5:9000"
timeout_secs = 5

[widget]
start_open = true
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.primary.url, "http://10.0.0.5:9000");
        assert_eq!(config.primary.timeout_secs, Some(5));
        assert_eq!(config.fallback, default_fallback());
        assert!(config.widget.start_open);
        assert_eq!(config.service.query_path, "/query");
    }

    #[test]
    fn unparseable_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "primary = [not toml").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[
                ("PARLEY_PRIMARY_URL", "http://127.0.0.1:1234"),
                ("PARLEY_FALLBACK_URL", "https://backup.example.com"),
                ("PARLEY_PRIMARY_TIMEOUT_SECS", "7"),
            ]))
            .unwrap();
        assert_eq!(config.primary.url, "http://127.0.0.1:1234");
        assert_eq!(config.fallback.url, "https://backup.example.com");
        assert_eq!(config.primary.timeout(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn bad_timeout_override_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(env(&[("PARLEY_PRIMARY_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn invalid_endpoints_rejected() {
        let mut config = AppConfig::default();
        config.fallback.url = "ftp://example.com".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.primary.url = "  ".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.primary.timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_answer_fields_rejected() {
        let mut config = AppConfig::default();
        config.service.answer_fields.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn service_contract_uses_configured_fields() {
        let mut config = AppConfig::default();
        config.service.answer_fields = vec!["reply".into()];
        config.service.placeholder_answer = "(nothing)".into();
        let contract = config.service.contract();
        assert_eq!(contract.extract(br#"{"reply": "R"}"#).text, "R");
        assert_eq!(contract.extract(br#"{"response": "X"}"#).text, "(nothing)");
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("localhost:8000"));
        assert!(toml_str.contains("timeout_secs = 50"));
        assert!(toml_str.contains("{error}"));
    }

    #[test]
    fn error_template_default_matches_widget_default() {
        let config = AppConfig::default();
        assert_eq!(config.widget.error_template, DEFAULT_ERROR_TEMPLATE);
    }

    #[test]
    fn config_error_converts_to_core_error() {
        let err: parley_core::Error = ConfigError::ValidationError("bad".into()).into();
        assert!(err.to_string().contains("bad"));
    }
}
