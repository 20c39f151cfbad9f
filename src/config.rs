//! Runtime configuration for the card sync client.
//!
//! Values come from the process environment, optionally seeded from a `.env` file. Every key
//! has a default, so an empty environment yields a working configuration.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://your-api-backend.com/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_millis(5_000);
pub const DEFAULT_HISTORY_CAP: usize = 5;
pub const DEFAULT_DATA_DIR: &str = "./data";

const ENV_API_URL: &str = "CARD_BALANCE_API_URL";
const ENV_TIMEOUT_MS: &str = "CARD_BALANCE_TIMEOUT_MS";
const ENV_HEALTH_TIMEOUT_MS: &str = "CARD_BALANCE_HEALTH_TIMEOUT_MS";
const ENV_HISTORY_CAP: &str = "CARD_BALANCE_HISTORY_CAP";
const ENV_DATA_DIR: &str = "CARD_BALANCE_DATA_DIR";
const ENV_FALLBACK_SEED: &str = "CARD_BALANCE_FALLBACK_SEED";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Invalid value for {key}: '{value}'")]
	Invalid { key: &'static str, value: String },
}

/// Configuration for the sync client
#[derive(Debug, Clone)]
pub struct SyncConfig {
	/// Base URL of the recognition service.
	pub api_base_url: String,
	/// Deadline for scan and refresh calls.
	pub request_timeout: Duration,
	/// Deadline for the health probe.
	pub health_timeout: Duration,
	/// Maximum retained transaction history after a fallback refresh.
	pub history_cap: usize,
	/// Directory holding the persisted card record.
	pub data_dir: PathBuf,
	/// Seed for the fallback balance delta. `None` draws from OS entropy.
	pub fallback_seed: Option<u64>,
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			api_base_url: DEFAULT_API_BASE_URL.to_string(),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			health_timeout: DEFAULT_HEALTH_TIMEOUT,
			history_cap: DEFAULT_HISTORY_CAP,
			data_dir: PathBuf::from(DEFAULT_DATA_DIR),
			fallback_seed: None,
		}
	}
}

impl SyncConfig {
	/// Load from `.env` (if present) and the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		dotenv::dotenv().ok();
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Build from an arbitrary key lookup. Unset keys keep their defaults.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut config = Self::default();

		if let Some(url) = lookup(ENV_API_URL) {
			config.api_base_url = url;
		}
		if let Some(value) = lookup(ENV_TIMEOUT_MS) {
			config.request_timeout = Duration::from_millis(parse_positive(ENV_TIMEOUT_MS, &value)?);
		}
		if let Some(value) = lookup(ENV_HEALTH_TIMEOUT_MS) {
			config.health_timeout =
				Duration::from_millis(parse_positive(ENV_HEALTH_TIMEOUT_MS, &value)?);
		}
		if let Some(value) = lookup(ENV_HISTORY_CAP) {
			config.history_cap = parse_positive(ENV_HISTORY_CAP, &value)? as usize;
		}
		if let Some(dir) = lookup(ENV_DATA_DIR) {
			config.data_dir = PathBuf::from(dir);
		}
		if let Some(value) = lookup(ENV_FALLBACK_SEED) {
			let seed = value.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
				key: ENV_FALLBACK_SEED,
				value: value.clone(),
			})?;
			config.fallback_seed = Some(seed);
		}

		Ok(config)
	}
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
	match value.trim().parse::<u64>() {
		Ok(n) if n > 0 => Ok(n),
		_ => Err(ConfigError::Invalid {
			key,
			value: value.to_string(),
		}),
	}
}
