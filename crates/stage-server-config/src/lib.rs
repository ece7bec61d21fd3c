// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for the Stage server.
//!
//! Sources are merged in precedence order: built-in defaults, then the TOML
//! file (`$STAGE_CONFIG` or `/etc/stage/config.toml`), then `STAGE_SERVER_*`
//! environment variables. Secrets come from the environment only.

pub mod error;
pub mod layer;
pub mod secret;
pub mod sections;
pub mod sources;

use std::net::SocketAddr;
use std::path::Path;

use rand::RngCore;
use tracing::{info, warn};

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use secret::SecretString;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub storage: StorageConfig,
	pub internships: InternshipsConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
		format!("{}:{}", self.http.host, self.http.port)
			.parse()
			.map_err(|e| ConfigError::InvalidValue {
				key: "http.host".to_string(),
				message: format!("{e}"),
			})
	}
}

/// Load configuration from defaults, the system config file and the environment.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource::new()),
	])
}

/// Like [`load_config`] but with an explicit config file path.
pub fn load_config_with_file(path: impl AsRef<Path>) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(path.as_ref())),
		Box::new(EnvSource::new()),
	])
}

/// Merge the given sources by precedence and finalize.
pub fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in &sources {
		let layer = source.load()?;
		tracing::debug!(source = source.name(), "merged config source");
		merged.merge(layer);
	}

	finalize(merged)
}

fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let mut config = ServerConfig {
		http: layer.http.unwrap_or_default().finalize(),
		database: layer.database.unwrap_or_default().finalize(),
		auth: layer.auth.unwrap_or_default().finalize(),
		storage: layer.storage.unwrap_or_default().finalize(),
		internships: layer.internships.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	if config.auth.jwt_secret.is_none() {
		warn!("no JWT secret configured, generating an ephemeral one; tokens will not survive a restart");
		config.auth.jwt_secret = Some(generate_secret());
	}

	info!(
		host = %config.http.host,
		port = config.http.port,
		environment = %config.auth.environment,
		bootstrap_enabled = config.auth.bootstrap_enabled,
		storage_root = %config.storage.root.display(),
		"configuration loaded"
	);

	Ok(config)
}

fn generate_secret() -> SecretString {
	let mut bytes = [0u8; 32];
	rand::thread_rng().fill_bytes(&mut bytes);
	SecretString::new(hex::encode(bytes))
}

/// Reject configurations that are unsafe or unusable.
pub fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
	if config.http.port == 0 {
		return Err(ConfigError::Validation("http.port must not be 0".to_string()));
	}
	if config.database.max_connections == 0 {
		return Err(ConfigError::Validation(
			"database.max_connections must be at least 1".to_string(),
		));
	}
	if config.storage.max_upload_bytes == 0 {
		return Err(ConfigError::Validation(
			"storage.max_upload_bytes must be at least 1".to_string(),
		));
	}
	if config.auth.bootstrap_enabled && config.auth.is_production() {
		return Err(ConfigError::Validation(
			"bootstrap endpoint cannot be enabled in production".to_string(),
		));
	}
	if config.auth.bootstrap_enabled && config.auth.bootstrap_token.is_none() {
		return Err(ConfigError::Validation(
			"bootstrap is enabled but STAGE_SERVER_AUTH_BOOTSTRAP_TOKEN is not set".to_string(),
		));
	}
	if config.auth.is_production() && config.auth.jwt_secret.is_none() {
		return Err(ConfigError::Validation(
			"STAGE_SERVER_AUTH_JWT_SECRET is required in production".to_string(),
		));
	}
	Ok(())
}
