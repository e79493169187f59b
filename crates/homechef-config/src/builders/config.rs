//! Configuration builder for creating test and development configurations.
//!
//! Builds a `Config` with a single in-memory source so tests do not need a
//! TOML file on disk.

use crate::{
	ApiConfig, Config, DeskConfig, PollConfig, SessionConfig, SourceConfig, ViewConfig,
};
use homechef_types::{GroupKey, Role, SecretString, SortKey};
use std::collections::HashMap;

/// Builder for creating `Config` instances with a fluent API.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	desk_id: String,
	principal_id: String,
	role: Role,
	auth_token: String,
	source_primary: String,
	source_config: toml::Value,
	page_size: usize,
	sort: SortKey,
	group: GroupKey,
	poll_interval_seconds: u64,
	api: Option<ApiConfig>,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Creates a new `ConfigBuilder` with default values suitable for testing.
	pub fn new() -> Self {
		Self {
			desk_id: "test-desk".to_string(),
			principal_id: "1".to_string(),
			role: Role::Chef,
			auth_token: "test-token".to_string(),
			source_primary: "memory".to_string(),
			source_config: toml::Value::Table(toml::map::Map::new()),
			page_size: 10,
			sort: SortKey::default(),
			group: GroupKey::default(),
			poll_interval_seconds: 300,
			api: None,
		}
	}

	pub fn desk_id(mut self, id: impl Into<String>) -> Self {
		self.desk_id = id.into();
		self
	}

	pub fn principal_id(mut self, id: impl Into<String>) -> Self {
		self.principal_id = id.into();
		self
	}

	pub fn role(mut self, role: Role) -> Self {
		self.role = role;
		self
	}

	pub fn auth_token(mut self, token: impl Into<String>) -> Self {
		self.auth_token = token.into();
		self
	}

	/// Sets the primary source implementation and its raw configuration.
	pub fn source(mut self, primary: impl Into<String>, config: toml::Value) -> Self {
		self.source_primary = primary.into();
		self.source_config = config;
		self
	}

	pub fn page_size(mut self, page_size: usize) -> Self {
		self.page_size = page_size;
		self
	}

	pub fn sort(mut self, sort: SortKey) -> Self {
		self.sort = sort;
		self
	}

	pub fn group(mut self, group: GroupKey) -> Self {
		self.group = group;
		self
	}

	pub fn poll_interval_seconds(mut self, seconds: u64) -> Self {
		self.poll_interval_seconds = seconds;
		self
	}

	/// Sets the API configuration.
	pub fn api(mut self, api: Option<ApiConfig>) -> Self {
		self.api = api;
		self
	}

	/// Builds the `Config` with the configured values.
	pub fn build(self) -> Config {
		let mut implementations = HashMap::new();
		implementations.insert(self.source_primary.clone(), self.source_config);

		Config {
			desk: DeskConfig { id: self.desk_id },
			session: SessionConfig {
				principal_id: self.principal_id,
				role: self.role,
				auth_token: SecretString::from(self.auth_token),
			},
			source: SourceConfig {
				primary: self.source_primary,
				implementations,
			},
			view: ViewConfig {
				page_size: self.page_size,
				sort: self.sort,
				group: self.group,
			},
			poll: PollConfig {
				interval_seconds: self.poll_interval_seconds,
			},
			api: self.api,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builder_defaults() {
		let config = ConfigBuilder::new().build();
		assert_eq!(config.desk.id, "test-desk");
		assert!(config.primary_source().is_some());
		assert_eq!(config.session().role, Role::Chef);
	}

	#[test]
	fn test_builder_overrides() {
		let config = ConfigBuilder::new()
			.role(Role::Customer)
			.page_size(5)
			.group(GroupKey::Status)
			.poll_interval_seconds(10)
			.build();
		assert_eq!(config.view_defaults().page_size, 5);
		assert_eq!(config.view_defaults().group, GroupKey::Status);
		assert_eq!(config.poll.interval_seconds, 10);
		assert_eq!(config.session.role, Role::Customer);
	}
}
