// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the `herbridge-admin` tool.
//!
//! Layered configuration from built-in defaults, a TOML file and
//! `HERBRIDGE_*` environment variables, in increasing precedence.
//!
//! ```ignore
//! use herbridge_config::load_config;
//!
//! let config = load_config()?;
//! println!("database: {}", config.database.url);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::AdminConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct AdminConfig {
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
	pub provisioning: ProvisioningConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`HERBRIDGE_*`)
/// 2. Config file (`/etc/herbridge/admin.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<AdminConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Load configuration with a custom config file path in place of the
/// system one.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<AdminConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Merge `sources` in precedence order and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<AdminConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = AdminConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

fn finalize(layer: AdminConfigLayer) -> Result<AdminConfig, ConfigError> {
	let database = layer.database.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let provisioning = layer.provisioning.unwrap_or_default().finalize();

	validate_database(&database)?;

	info!(
		database = %database.url,
		log_level = %logging.level,
		atomic = provisioning.atomic,
		grant_admin_flags = provisioning.grant_admin_flags,
		"configuration loaded"
	);

	Ok(AdminConfig {
		database,
		logging,
		provisioning,
	})
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
	if !database.url.starts_with("sqlite:") {
		return Err(ConfigError::Validation(format!(
			"database.url must be a sqlite: URL, got '{}'",
			database.url
		)));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn file_with(contents: &str) -> tempfile::NamedTempFile {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(contents.as_bytes()).unwrap();
		file
	}

	fn load_file_only(path: &std::path::Path) -> Result<AdminConfig, ConfigError> {
		let sources: Vec<Box<dyn ConfigSource>> =
			vec![Box::new(TomlSource::new(path)), Box::new(DefaultsSource)];
		load_from_sources(sources)
	}

	#[test]
	fn defaults_when_nothing_is_configured() {
		let sources: Vec<Box<dyn ConfigSource>> = vec![Box::new(DefaultsSource)];
		let config = load_from_sources(sources).unwrap();
		assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
		assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
		assert_eq!(config.provisioning, ProvisioningConfig::default());
	}

	#[test]
	fn file_overrides_defaults() {
		let file = file_with(
			"[database]\nurl = \"sqlite:/srv/admin.db\"\n\n[provisioning]\natomic = false\n",
		);
		let config = load_file_only(file.path()).unwrap();
		assert_eq!(config.database.url, "sqlite:/srv/admin.db");
		assert!(!config.provisioning.atomic);
		assert!(config.provisioning.grant_admin_flags);
		assert_eq!(config.logging.level, "warn");
	}

	#[test]
	fn partial_file_keeps_other_defaults() {
		let file = file_with("[logging]\nlevel = \"info\"\n");
		let config = load_file_only(file.path()).unwrap();
		assert_eq!(config.logging.level, "info");
		assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
	}

	#[test]
	fn non_sqlite_url_fails_validation() {
		let file = file_with("[database]\nurl = \"postgres://localhost/db\"\n");
		let err = load_file_only(file.path()).unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}
}
