//! Configuration module for the homechef order desk.
//!
//! This module provides structures and utilities for managing desk
//! configuration. It supports loading configuration from TOML files and
//! validates the result so that every required value is set before the desk
//! starts.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["file1.toml", "file2.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)

mod loader;

/// Fluent builders for test configurations.
#[cfg(feature = "testing")]
pub mod builders {
	pub mod config;
}

#[cfg(feature = "testing")]
pub use builders::config::ConfigBuilder;

use homechef_types::{GroupKey, Role, SecretString, Session, SortKey, ViewParams};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Largest page a view may request.
pub const MAX_PAGE_SIZE: usize = 100;
/// Bounds of the refresh interval in seconds.
pub const MIN_POLL_INTERVAL_SECONDS: u64 = 5;
pub const MAX_POLL_INTERVAL_SECONDS: u64 = 86400;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only; the default rendering echoes the input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the order desk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this desk instance.
	pub desk: DeskConfig,
	/// Who the desk acts as when talking to the order API.
	pub session: SessionConfig,
	/// Where orders and settings come from.
	pub source: SourceConfig,
	/// Defaults applied to list views.
	#[serde(default)]
	pub view: ViewConfig,
	/// Periodic refresh of the order list.
	#[serde(default)]
	pub poll: PollConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to the desk instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeskConfig {
	/// Unique identifier for this desk, used in logs.
	pub id: String,
}

/// Caller identity passed to every data source request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
	/// Chef id or user id, depending on `role`.
	pub principal_id: String,
	pub role: Role,
	/// Bearer token for the order API. Usually `${HOMECHEF_TOKEN}`.
	#[serde(default)]
	pub auth_token: SecretString,
}

/// Configuration for the order data source.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
	/// Which implementation to use.
	pub primary: String,
	/// Map of source implementation names to their raw configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Defaults for list views that do not specify their own.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewConfig {
	#[serde(default = "default_page_size")]
	pub page_size: usize,
	#[serde(default)]
	pub sort: SortKey,
	#[serde(default)]
	pub group: GroupKey,
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self {
			page_size: default_page_size(),
			sort: SortKey::default(),
			group: GroupKey::default(),
		}
	}
}

fn default_page_size() -> usize {
	10
}

/// Configuration for the background refresh loop.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollConfig {
	/// Seconds between two refreshes. Defaults to 5 minutes.
	#[serde(default = "default_poll_interval")]
	pub interval_seconds: u64,
}

impl Default for PollConfig {
	fn default() -> Self {
		Self {
			interval_seconds: default_poll_interval(),
		}
	}
}

fn default_poll_interval() -> u64 {
	300
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Request timeout in seconds.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

fn default_api_timeout() -> u64 {
	30
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let var_name = var_name.as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)))
				},
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	///
	/// Each top-level section must be unique across all configuration files.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// The session the desk acts as.
	pub fn session(&self) -> Session {
		Session::new(
			self.session.principal_id.clone(),
			self.session.role,
			self.session.auth_token.clone(),
		)
	}

	/// View parameters used when a request does not override them.
	pub fn view_defaults(&self) -> ViewParams {
		ViewParams {
			sort: self.view.sort,
			group: self.view.group,
			page_size: self.view.page_size,
			..ViewParams::default()
		}
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.poll.interval_seconds)
	}

	/// Raw configuration of the primary source implementation.
	pub fn primary_source(&self) -> Option<&toml::Value> {
		self.source.implementations.get(&self.source.primary)
	}

	/// Validates the configuration to ensure all required fields are properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.desk.id.trim().is_empty() {
			return Err(ConfigError::Validation("Desk ID cannot be empty".into()));
		}

		if self.session.principal_id.trim().is_empty() {
			return Err(ConfigError::Validation(
				"Session principal_id cannot be empty".into(),
			));
		}

		if self.source.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one source implementation must be configured".into(),
			));
		}
		if self.source.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Source primary implementation cannot be empty".into(),
			));
		}
		if !self
			.source
			.implementations
			.contains_key(&self.source.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary source '{}' not found in implementations",
				self.source.primary
			)));
		}

		if self.view.page_size == 0 || self.view.page_size > MAX_PAGE_SIZE {
			return Err(ConfigError::Validation(format!(
				"View page_size must be between 1 and {}",
				MAX_PAGE_SIZE
			)));
		}

		if self.poll.interval_seconds < MIN_POLL_INTERVAL_SECONDS {
			return Err(ConfigError::Validation(format!(
				"Poll interval_seconds must be at least {}",
				MIN_POLL_INTERVAL_SECONDS
			)));
		}
		if self.poll.interval_seconds > MAX_POLL_INTERVAL_SECONDS {
			return Err(ConfigError::Validation(format!(
				"Poll interval_seconds cannot exceed {} (24 hours)",
				MAX_POLL_INTERVAL_SECONDS
			)));
		}

		if let Some(ref api) = self.api {
			if api.enabled && api.timeout_seconds == 0 {
				return Err(ConfigError::Validation(
					"API timeout_seconds must be greater than 0".into(),
				));
			}
		}

		Ok(())
	}
}

/// Parses a TOML string, resolving environment variables and validating
/// the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const BASE: &str = r#"
[desk]
id = "desk-1"

[session]
principal_id = "42"
role = "chef"
auth_token = "token"

[source]
primary = "memory"
[source.implementations.memory]
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TEST_HC_HOST", "localhost");
		std::env::set_var("TEST_HC_PORT", "5432");

		let input = "host = \"${TEST_HC_HOST}:${TEST_HC_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5432\"");

		std::env::remove_var("TEST_HC_HOST");
		std::env::remove_var("TEST_HC_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${MISSING_HC_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${MISSING_HC_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("MISSING_HC_VAR"));
	}

	#[test]
	fn test_minimal_config_uses_defaults() {
		let config: Config = BASE.parse().unwrap();
		assert_eq!(config.desk.id, "desk-1");
		assert_eq!(config.view.page_size, 10);
		assert_eq!(config.poll_interval(), Duration::from_secs(300));
		assert!(config.api.is_none());

		let session = config.session();
		assert_eq!(session.role, Role::Chef);
		assert_eq!(session.auth_token.expose_secret(), "token");

		let view = config.view_defaults();
		assert_eq!(view.page, 1);
		assert_eq!(view.sort, SortKey::DeliveryTime);
	}

	#[test]
	fn test_config_with_env_token() {
		std::env::set_var("TEST_HC_TOKEN", "secret-token");
		let config_str = BASE.replace("\"token\"", "\"${TEST_HC_TOKEN}\"");

		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.session.auth_token.expose_secret(), "secret-token");
		assert!(!format!("{:?}", config).contains("secret-token"));

		std::env::remove_var("TEST_HC_TOKEN");
	}

	#[test]
	fn test_view_and_poll_sections() {
		let config_str = format!(
			"{}\n[view]\npage_size = 25\nsort = \"created_at\"\ngroup = \"area\"\n\n[poll]\ninterval_seconds = 60\n",
			BASE
		);
		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.view.page_size, 25);
		assert_eq!(config.view.sort, SortKey::CreatedAt);
		assert_eq!(config.view.group, GroupKey::Area);
		assert_eq!(config.poll.interval_seconds, 60);
	}

	#[test]
	fn test_unknown_primary_rejected() {
		let config_str = BASE.replace("primary = \"memory\"", "primary = \"http\"");
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err
			.to_string()
			.contains("Primary source 'http' not found in implementations"));
	}

	#[test]
	fn test_page_size_bounds() {
		let config_str = format!("{}\n[view]\npage_size = 0\n", BASE);
		assert!(Config::from_str(&config_str).is_err());

		let config_str = format!("{}\n[view]\npage_size = 101\n", BASE);
		assert!(Config::from_str(&config_str).is_err());
	}

	#[test]
	fn test_poll_interval_bounds() {
		let config_str = format!("{}\n[poll]\ninterval_seconds = 1\n", BASE);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("at least 5"));

		let config_str = format!("{}\n[poll]\ninterval_seconds = 90000\n", BASE);
		assert!(Config::from_str(&config_str).is_err());
	}

	#[test]
	fn test_unknown_role_rejected() {
		let config_str = BASE.replace("role = \"chef\"", "role = \"courier\"");
		assert!(matches!(
			Config::from_str(&config_str),
			Err(ConfigError::Parse(_))
		));
	}

	#[test]
	fn test_api_section() {
		let config_str = format!("{}\n[api]\nenabled = true\nport = 8080\n", BASE);
		let config: Config = config_str.parse().unwrap();
		let api = config.api.unwrap();
		assert!(api.enabled);
		assert_eq!(api.host, "127.0.0.1");
		assert_eq!(api.port, 8080);
		assert_eq!(api.timeout_seconds, 30);
	}
}
