//! Configuration loading for the order submitter.
//!
//! Configuration is read from a TOML, JSON or YAML file (chosen by
//! extension), `${VAR}` references are substituted from the environment,
//! selected settings are overridden by `SUBMITTER_*` variables, and the
//! result is validated before use.

use regex::Regex;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub mod types;

pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
	Toml,
	Json,
	Yaml,
}

impl ConfigFormat {
	fn from_path(path: &Path) -> Result<Self, ConfigError> {
		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Ok(Self::Toml),
			Some("json") => Ok(Self::Json),
			Some("yaml") | Some("yml") => Ok(Self::Yaml),
			_ => Err(ConfigError::ParseError(format!(
				"Unsupported config format: {:?}",
				path
			))),
		}
	}
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "SUBMITTER_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<SubmitterConfig, ConfigError> {
		let file_path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;

		let mut config = self.load_from_file(file_path).await?;

		self.apply_env_overrides(&mut config)?;

		validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, file_path: &str) -> Result<SubmitterConfig, ConfigError> {
		let path = Path::new(file_path);
		if !path.exists() {
			return Err(ConfigError::FileNotFound(file_path.to_string()));
		}
		let format = ConfigFormat::from_path(path)?;

		let content = tokio::fs::read_to_string(path).await?;
		let substituted = substitute_env_vars(&content)?;

		parse_config(&substituted, format)
	}

	fn apply_env_overrides(&self, config: &mut SubmitterConfig) -> Result<(), ConfigError> {
		let var = |name: &str| env::var(format!("{}{}", self.env_prefix, name)).ok();

		if let Some(log_level) = var("LOG_LEVEL") {
			config.submitter.log_level = log_level;
		}

		if let Some(rpc_url) = var("RPC_URL") {
			debug!("Overriding RPC URL from environment");
			config.network.rpc_url = rpc_url;
		}

		if let Some(key) = var("PRIVATE_KEY") {
			debug!("Overriding private key from environment");
			config.account.private_key = key;
		}

		if let Some(key) = var("PRICING_API_KEY") {
			debug!("Overriding pricing API key from environment");
			config.pricing.api_key = key;
		}

		if let Some(strategy) = var("DELIVERY_STRATEGY") {
			config.delivery.strategy = strategy
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid strategy: {}", e)))?;
		}

		Ok(())
	}
}

/// Parses configuration text in the given format.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<SubmitterConfig, ConfigError> {
	match format {
		ConfigFormat::Toml => toml::from_str(content)
			.map_err(|e| ConfigError::ParseError(format!("Failed to parse TOML: {}", e))),
		ConfigFormat::Json => serde_json::from_str(content)
			.map_err(|e| ConfigError::ParseError(format!("Failed to parse JSON: {}", e))),
		ConfigFormat::Yaml => serde_yaml::from_str(content)
			.map_err(|e| ConfigError::ParseError(format!("Failed to parse YAML: {}", e))),
	}
}

/// Replaces `${VAR_NAME}` patterns with environment values.
fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;
	let mut result = content.to_string();

	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let env_value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

		result = result.replace(full_match, &env_value);
	}

	Ok(result)
}

/// Validates a loaded configuration.
pub fn validate_config(config: &SubmitterConfig) -> Result<(), ConfigError> {
	let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

	if config.network.chain_id == 0 {
		return invalid("network.chain_id must be non-zero".to_string());
	}
	validate_url("network.rpc_url", &config.network.rpc_url)?;
	validate_private_key(&config.account.private_key)?;

	validate_url("pricing.base_url", &config.pricing.base_url)?;
	if config.pricing.api_key.is_empty() {
		return invalid("pricing.api_key must not be empty".to_string());
	}
	if config.pricing.timeout_ms == 0 {
		return invalid("pricing.timeout_ms must be non-zero".to_string());
	}

	if config.permit.deadline_secs == 0 {
		return invalid("permit.deadline_secs must be non-zero".to_string());
	}

	let delivery = &config.delivery;
	if delivery.timeout_ms == 0 || delivery.poll_interval_ms == 0 {
		return invalid("delivery timeout and poll interval must be non-zero".to_string());
	}
	if delivery.strategy == DeliveryStrategy::Sponsored {
		let Some(sponsored) = &delivery.sponsored else {
			return invalid("delivery.sponsored is required for the sponsored strategy".to_string());
		};
		validate_url("delivery.sponsored.relayer_url", &sponsored.relayer_url)?;
		if let Some(url) = &sponsored.sponsor_url {
			validate_url("delivery.sponsored.sponsor_url", url)?;
		}
		if sponsored.max_fee_per_gas.is_some() != sponsored.max_priority_fee_per_gas.is_some() {
			return invalid(
				"delivery.sponsored max_fee_per_gas and max_priority_fee_per_gas must be set together"
					.to_string(),
			);
		}
	}

	let mut symbols = std::collections::HashSet::new();
	for asset in &config.assets {
		if !symbols.insert(asset.symbol.to_ascii_uppercase()) {
			return invalid(format!("Duplicate asset symbol '{}'", asset.symbol));
		}
	}

	Ok(())
}

fn validate_url(field: &str, url: &str) -> Result<(), ConfigError> {
	if url.starts_with("http://") || url.starts_with("https://") {
		Ok(())
	} else {
		Err(ConfigError::ValidationError(format!(
			"{} must start with http:// or https://",
			field
		)))
	}
}

fn validate_private_key(key: &str) -> Result<(), ConfigError> {
	let Some(stripped) = key.strip_prefix("0x") else {
		return Err(ConfigError::ValidationError(
			"Private key must start with 0x".to_string(),
		));
	};
	if stripped.len() != 64 {
		return Err(ConfigError::ValidationError(
			"Private key must be 64 hex characters (32 bytes)".to_string(),
		));
	}
	if hex::decode(stripped).is_err() {
		return Err(ConfigError::ValidationError(
			"Private key must be valid hexadecimal".to_string(),
		));
	}
	Ok(())
}
