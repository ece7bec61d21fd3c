// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, a TOML file and environment variables.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::secret::SecretString;
use crate::sections::{
	AuthConfigLayer, DatabaseConfigLayer, HttpConfigLayer, InternshipsConfigLayer,
	LoggingConfigLayer, StorageConfigLayer,
};

/// Environment variable holding the config file path.
pub const CONFIG_PATH_ENV: &str = "STAGE_CONFIG";

pub const SYSTEM_CONFIG_PATH: &str = "/etc/stage/config.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// `$STAGE_CONFIG`, else `/etc/stage/config.toml`.
	pub fn system() -> Self {
		Self::new(env_var(CONFIG_PATH_ENV).unwrap_or_else(|| SYSTEM_CONFIG_PATH.to_string()))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Environment variable source.
///
/// Convention: `STAGE_SERVER_<SECTION>_<FIELD>`. Secrets also accept
/// `<NAME>_FILE` pointing at a file holding the value.
pub struct EnvSource {
	lookup: Box<Lookup>,
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl EnvSource {
	/// Read from the process environment.
	pub fn new() -> Self {
		Self {
			lookup: Box::new(|name| std::env::var(name).ok()),
		}
	}

	/// Read from a custom lookup, e.g. a map in tests.
	pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
		Self {
			lookup: Box::new(lookup),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		(self.lookup)(name).filter(|s| !s.is_empty())
	}

	fn bool(&self, name: &str) -> Option<bool> {
		self.var(name)
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	fn parsed<T: std::str::FromStr>(&self, name: &str, kind: &str) -> Result<Option<T>, ConfigError> {
		match self.var(name) {
			Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid {kind} value '{v}'"),
			}),
			None => Ok(None),
		}
	}

	/// `NAME`, else the contents of the file named by `NAME_FILE` (trailing
	/// newline trimmed).
	fn secret(&self, name: &str) -> Result<Option<SecretString>, ConfigError> {
		if let Some(value) = self.var(name) {
			return Ok(Some(SecretString::new(value)));
		}
		let file_var = format!("{name}_FILE");
		match self.var(&file_var) {
			Some(path) => {
				let content = std::fs::read_to_string(&path)
					.map_err(|e| ConfigError::Secret(format!("{file_var}={path}: {e}")))?;
				Ok(Some(SecretString::new(content.trim_end_matches(['\r', '\n']).to_string())))
			}
			None => Ok(None),
		}
	}

	fn http(&self) -> Result<HttpConfigLayer, ConfigError> {
		Ok(HttpConfigLayer {
			host: self.var("STAGE_SERVER_HTTP_HOST"),
			port: self.parsed("STAGE_SERVER_HTTP_PORT", "u16")?,
			base_url: self.var("STAGE_SERVER_HTTP_BASE_URL"),
		})
	}

	fn database(&self) -> Result<DatabaseConfigLayer, ConfigError> {
		Ok(DatabaseConfigLayer {
			url: self.var("STAGE_SERVER_DATABASE_URL"),
			max_connections: self.parsed("STAGE_SERVER_DATABASE_MAX_CONNECTIONS", "u32")?,
		})
	}

	fn auth(&self) -> Result<AuthConfigLayer, ConfigError> {
		Ok(AuthConfigLayer {
			environment: self.var("STAGE_SERVER_AUTH_ENVIRONMENT"),
			session_ttl_hours: self.parsed("STAGE_SERVER_AUTH_SESSION_TTL_HOURS", "u64")?,
			jwt_secret: self.secret("STAGE_SERVER_AUTH_JWT_SECRET")?,
			jwt_issuer: self.var("STAGE_SERVER_AUTH_JWT_ISSUER"),
			jwt_ttl_minutes: self.parsed("STAGE_SERVER_AUTH_JWT_TTL_MINUTES", "u64")?,
			cookie_secure: self.bool("STAGE_SERVER_AUTH_COOKIE_SECURE"),
			bootstrap_enabled: self.bool("STAGE_SERVER_AUTH_BOOTSTRAP_ENABLED"),
			bootstrap_token: self.secret("STAGE_SERVER_AUTH_BOOTSTRAP_TOKEN")?,
		})
	}

	fn storage(&self) -> Result<StorageConfigLayer, ConfigError> {
		Ok(StorageConfigLayer {
			root: self.var("STAGE_SERVER_STORAGE_ROOT").map(PathBuf::from),
			max_upload_bytes: self.parsed("STAGE_SERVER_STORAGE_MAX_UPLOAD_BYTES", "u64")?,
		})
	}

	fn internships(&self) -> Result<InternshipsConfigLayer, ConfigError> {
		Ok(InternshipsConfigLayer {
			default_company: self.var("STAGE_SERVER_INTERNSHIPS_DEFAULT_COMPANY"),
			default_position: self.var("STAGE_SERVER_INTERNSHIPS_DEFAULT_POSITION"),
			duration_days: self.parsed("STAGE_SERVER_INTERNSHIPS_DURATION_DAYS", "u32")?,
		})
	}

	fn logging(&self) -> Result<LoggingConfigLayer, ConfigError> {
		Ok(LoggingConfigLayer {
			level: self.var("STAGE_SERVER_LOGGING_LEVEL"),
			format: self.parsed("STAGE_SERVER_LOGGING_FORMAT", "log format")?,
		})
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(self.http()?),
			database: Some(self.database()?),
			auth: Some(self.auth()?),
			storage: Some(self.storage()?),
			internships: Some(self.internships()?),
			logging: Some(self.logging()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}
