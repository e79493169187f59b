//! Loader for configurations split across several files.
//!
//! The main file may name other files in `include` (a string or an array of
//! strings, relative to the main file). Their top-level sections are merged
//! into the main table. A section defined twice is an error, and a file may
//! be read only once per load.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

const INCLUDE_KEY: &str = "include";

/// Configuration loader that handles multi-file configurations with includes.
pub struct ConfigLoader {
	base_dir: PathBuf,
	/// Canonical paths read so far.
	seen: HashSet<PathBuf>,
	/// File each top-level section came from.
	section_owners: HashMap<String, PathBuf>,
}

impl ConfigLoader {
	pub fn new(base_dir: impl AsRef<Path>) -> Self {
		Self {
			base_dir: base_dir.as_ref().to_path_buf(),
			seen: HashSet::new(),
			section_owners: HashMap::new(),
		}
	}

	/// Loads `path` and everything it includes, then parses and validates
	/// the merged result.
	pub async fn load_config(&mut self, path: impl AsRef<Path>) -> Result<Config, ConfigError> {
		let main_path = self.locate(path.as_ref())?;
		let main_text = self.read(&main_path).await?;
		let mut merged: toml::Table = toml::from_str(&main_text)?;

		let includes = match merged.remove(INCLUDE_KEY) {
			Some(value) => include_paths(&value)?,
			None => return main_text.parse(),
		};

		self.claim_sections(&merged, &main_path)?;
		for include in includes {
			let include_path = self.locate(&include)?;
			let table: toml::Table = toml::from_str(&self.read(&include_path).await?)?;
			self.claim_sections(&table, &include_path)?;
			merged.extend(table);
		}

		// Parse the merged text so env handling and validation take one path.
		toml::to_string(&merged)
			.map_err(|e| ConfigError::Parse(format!("Failed to serialize combined config: {}", e)))?
			.parse()
	}

	/// Reads a file once, with environment variables resolved.
	async fn read(&mut self, path: &Path) -> Result<String, ConfigError> {
		let canonical = path.canonicalize().map_err(|e| {
			ConfigError::Io(io::Error::new(
				io::ErrorKind::NotFound,
				format!("Cannot resolve path {}: {}", path.display(), e),
			))
		})?;

		if !self.seen.insert(canonical.clone()) {
			return Err(ConfigError::Validation(format!(
				"Circular include detected: {} was already loaded",
				canonical.display()
			)));
		}

		let content = tokio::fs::read_to_string(path).await?;
		resolve_env_vars(&content)
	}

	fn claim_sections(&mut self, table: &toml::Table, file: &Path) -> Result<(), ConfigError> {
		for key in table.keys() {
			if let Some(owner) = self.section_owners.get(key) {
				return Err(ConfigError::Validation(format!(
					"Duplicate section '{}' found in {} and {}. \
					Each top-level section must be unique across all configuration files.",
					key,
					owner.display(),
					file.display()
				)));
			}
			self.section_owners.insert(key.clone(), file.to_path_buf());
		}
		Ok(())
	}

	fn locate(&self, path: &Path) -> Result<PathBuf, ConfigError> {
		let resolved = if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.base_dir.join(path)
		};

		if !resolved.exists() {
			return Err(ConfigError::Io(io::Error::new(
				io::ErrorKind::NotFound,
				format!("Configuration file not found: {}", resolved.display()),
			)));
		}
		Ok(resolved)
	}
}

/// Reads the `include` value: one path or an array of paths.
fn include_paths(value: &toml::Value) -> Result<Vec<PathBuf>, ConfigError> {
	match value {
		toml::Value::String(path) => Ok(vec![PathBuf::from(path)]),
		toml::Value::Array(items) => items
			.iter()
			.map(|item| {
				item.as_str().map(PathBuf::from).ok_or_else(|| {
					ConfigError::Validation("Include array must contain only strings".into())
				})
			})
			.collect(),
		_ => Err(ConfigError::Validation(
			"Include must be a string or array of strings".into(),
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	const DESK: &str = r#"
[desk]
id = "test-desk"

[session]
principal_id = "7"
role = "chef"
"#;

	const SOURCE: &str = r#"
[source]
primary = "memory"
[source.implementations.memory]
"#;

	#[tokio::test]
	async fn test_single_file_config() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("config.toml");
		fs::write(&config_path, format!("{}{}", DESK, SOURCE)).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let config = loader.load_config(&config_path).await.unwrap();

		assert_eq!(config.desk.id, "test-desk");
		assert_eq!(config.source.primary, "memory");
	}

	#[tokio::test]
	async fn test_config_with_includes() {
		let temp_dir = TempDir::new().unwrap();

		let main_config = format!("include = [\"source.toml\", \"poll.toml\"]\n{}", DESK);
		let poll_config = "[poll]\ninterval_seconds = 30\n";

		fs::write(temp_dir.path().join("main.toml"), main_config).unwrap();
		fs::write(temp_dir.path().join("source.toml"), SOURCE).unwrap();
		fs::write(temp_dir.path().join("poll.toml"), poll_config).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let config = loader.load_config("main.toml").await.unwrap();

		assert_eq!(config.desk.id, "test-desk");
		assert_eq!(config.source.primary, "memory");
		assert_eq!(config.poll.interval_seconds, 30);
	}

	#[tokio::test]
	async fn test_single_include_string() {
		let temp_dir = TempDir::new().unwrap();

		let main_config = format!("include = \"source.toml\"\n{}", DESK);
		fs::write(temp_dir.path().join("main.toml"), main_config).unwrap();
		fs::write(temp_dir.path().join("source.toml"), SOURCE).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		assert!(loader.load_config("main.toml").await.is_ok());
	}

	#[tokio::test]
	async fn test_duplicate_section_error() {
		let temp_dir = TempDir::new().unwrap();

		let main_config = format!("include = [\"duplicate.toml\"]\n{}{}", DESK, SOURCE);
		let duplicate_config = "[desk]\nid = \"another-desk\"\n";

		fs::write(temp_dir.path().join("main.toml"), main_config).unwrap();
		fs::write(temp_dir.path().join("duplicate.toml"), duplicate_config).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let result = loader.load_config("main.toml").await;

		let error_msg = result.unwrap_err().to_string();
		assert!(error_msg.contains("Duplicate section 'desk'"));
	}

	#[tokio::test]
	async fn test_self_include_detection() {
		let temp_dir = TempDir::new().unwrap();

		let config = format!("include = [\"self.toml\"]\n{}", DESK);
		fs::write(temp_dir.path().join("self.toml"), config).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let result = loader.load_config("self.toml").await;

		let error_msg = result.unwrap_err().to_string();
		assert!(error_msg.contains("already loaded"));
	}

	#[tokio::test]
	async fn test_missing_include() {
		let temp_dir = TempDir::new().unwrap();

		let config = format!("include = [\"nowhere.toml\"]\n{}", DESK);
		fs::write(temp_dir.path().join("main.toml"), config).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let result = loader.load_config("main.toml").await;

		assert!(matches!(result, Err(ConfigError::Io(_))));
	}

	#[test]
	fn test_include_value_shapes() {
		let bad: toml::Value = toml::Value::Integer(5);
		assert!(matches!(include_paths(&bad), Err(ConfigError::Validation(_))));

		let mixed: toml::Value = toml::Value::Array(vec![
			toml::Value::String("a.toml".into()),
			toml::Value::Boolean(true),
		]);
		assert!(include_paths(&mixed).is_err());
	}
}
