// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the Keel authorization service.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`KEEL_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use keel_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("anonymous visitors act as {}", config.rbac.anonymous_username);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub rbac: RbacConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`KEEL_SERVER_*`)
/// 2. Config file (`/etc/keel/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let rbac = layer.rbac.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	rbac.validate()?;

	info!(
		namespace_cache_capacity = ?rbac.namespace_cache_capacity,
		anonymous_username = %rbac.anonymous_username,
		log_decisions = rbac.log_decisions,
		log_format = %logging.format,
		"Server configuration loaded"
	);

	Ok(ServerConfig { rbac, logging })
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_finalize_defaults() {
		let config = finalize(ServerConfigLayer::default()).unwrap();
		assert_eq!(config.rbac, RbacConfig::default());
		assert_eq!(config.logging, LoggingConfig::default());
	}

	#[test]
	fn test_finalize_rejects_zero_capacity() {
		let layer = ServerConfigLayer {
			rbac: Some(RbacConfigLayer {
				namespace_cache_capacity: Some(0),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_load_config_with_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[rbac]
namespace_cache_capacity = 1024
log_decisions = true
"#
		)
		.unwrap();

		let config = load_config_with_file(file.path()).unwrap();
		assert_eq!(config.rbac.namespace_cache_capacity, Some(1024));
		assert!(config.rbac.log_decisions);
		assert_eq!(config.rbac.anonymous_username, "anonymous");
	}

	#[test]
	fn test_load_config_with_missing_file_uses_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let config = load_config_with_file(dir.path().join("absent.toml")).unwrap();
		assert_eq!(config.logging.level, "info");
	}
}
