// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Runtime configuration for the webhook receiver
//!
//! Values come from `GSALARY_*` environment variables (a `.env` file is
//! honored), or from a config file via [`WebhookServiceConfig::from_file`].

use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};
use gsalary_sdk::GSalaryConfig;
use serde::{Deserialize, Serialize};

/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log directory component name
pub const LOG_COMPONENT_NAME: &str = "webhook";

/// Default console output enabled (can be overridden by LOG_TO_CONSOLE environment variable)
pub const DEFAULT_LOG_TO_CONSOLE: bool = false;

/// Default HTTP server bind address (can be overridden by GSALARY_WEBHOOK_BIND_ADDR)
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8090";

/// Default maximum webhook body size in bytes (can be overridden by GSALARY_WEBHOOK_MAX_BODY_BYTES)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Default replay window in seconds, 0 disables the check
/// (can be overridden by GSALARY_WEBHOOK_REPLAY_WINDOW_SECS)
pub const DEFAULT_REPLAY_WINDOW_SECS: u64 = 0;

/// Webhook receiver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookServiceConfig {
	pub bind_addr: SocketAddr,
	/// Worker threads, actix default when unset
	pub workers: Option<usize>,
	pub max_body_bytes: usize,
	pub app_id: String,
	/// Inline PEM or bare base64, takes precedence over the file
	pub server_public_key: Option<String>,
	pub server_public_key_file: Option<PathBuf>,
	pub replay_window_secs: u64,
}

impl Default for WebhookServiceConfig {
	fn default() -> Self {
		Self {
			bind_addr: SocketAddr::from(([0, 0, 0, 0], 8090)),
			workers: None,
			max_body_bytes: DEFAULT_MAX_BODY_BYTES,
			app_id: String::new(),
			server_public_key: None,
			server_public_key_file: None,
			replay_window_secs: DEFAULT_REPLAY_WINDOW_SECS,
		}
	}
}

impl WebhookServiceConfig {
	pub fn from_env() -> Result<Self> {
		dotenv::dotenv().ok();

		let bind_addr_str = env::var("GSALARY_WEBHOOK_BIND_ADDR")
			.unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
		let bind_addr = bind_addr_str
			.parse()
			.with_context(|| format!("Invalid bind address: {}", bind_addr_str))?;

		let workers = env::var("GSALARY_WEBHOOK_WORKERS")
			.ok()
			.and_then(|w| w.parse().ok());

		let max_body_bytes = env::var("GSALARY_WEBHOOK_MAX_BODY_BYTES")
			.ok()
			.and_then(|v| v.parse().ok())
			.unwrap_or(DEFAULT_MAX_BODY_BYTES);

		let replay_window_secs = env::var("GSALARY_WEBHOOK_REPLAY_WINDOW_SECS")
			.ok()
			.and_then(|v| v.parse().ok())
			.unwrap_or(DEFAULT_REPLAY_WINDOW_SECS);

		Ok(Self {
			bind_addr,
			workers,
			max_body_bytes,
			app_id: env::var("GSALARY_APP_ID").unwrap_or_default(),
			server_public_key: env::var("GSALARY_SERVER_PUBLIC_KEY").ok(),
			server_public_key_file: env::var("GSALARY_SERVER_PUBLIC_KEY_FILE")
				.ok()
				.map(PathBuf::from),
			replay_window_secs,
		})
	}

	/// Load configuration from file, with `GSALARY_WEBHOOK_*` overrides
	pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(config::File::with_name(path))
			.add_source(config::Environment::with_prefix("GSALARY_WEBHOOK"))
			.build()?;

		cfg.try_deserialize()
	}

	pub fn replay_window(&self) -> Option<Duration> {
		(self.replay_window_secs > 0).then(|| Duration::from_secs(self.replay_window_secs))
	}

	/// SDK configuration holding the server public key
	pub fn gsalary_config(&self) -> Result<GSalaryConfig> {
		let config = GSalaryConfig::new(self.app_id.clone());
		let config = match (&self.server_public_key, &self.server_public_key_file) {
			(Some(pem), _) => config
				.with_server_public_key_pem(pem)
				.context("Invalid GSALARY_SERVER_PUBLIC_KEY")?,
			(None, Some(path)) => config
				.with_server_public_key_pem_file(path)
				.with_context(|| format!("Failed to load server public key from {}", path.display()))?,
			(None, None) => bail!(
				"Server public key is required: set GSALARY_SERVER_PUBLIC_KEY or GSALARY_SERVER_PUBLIC_KEY_FILE"
			),
		};
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const PUBLIC_PEM: &str = include_str!("../../sdk/tests/fixtures/client_public_key.pem");

	#[test]
	fn test_defaults() {
		let config = WebhookServiceConfig::default();
		assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
		assert_eq!(config.max_body_bytes, 1024 * 1024);
		assert_eq!(config.replay_window(), None);
	}

	#[test]
	fn test_replay_window() {
		let config = WebhookServiceConfig {
			replay_window_secs: 300,
			..Default::default()
		};
		assert_eq!(config.replay_window(), Some(Duration::from_secs(300)));
	}

	#[test]
	fn test_gsalary_config_requires_key() {
		assert!(WebhookServiceConfig::default().gsalary_config().is_err());

		let config = WebhookServiceConfig {
			app_id: "app1".to_string(),
			server_public_key: Some(PUBLIC_PEM.to_string()),
			..Default::default()
		};
		let sdk_config = config.gsalary_config().unwrap();
		assert_eq!(sdk_config.app_id, "app1");
		assert!(sdk_config.credentials.server_public_key().is_ok());
	}

	#[test]
	fn test_missing_key_file() {
		let config = WebhookServiceConfig {
			server_public_key_file: Some(PathBuf::from("/nonexistent/gsalary/server.pem")),
			..Default::default()
		};
		assert!(config.gsalary_config().is_err());
	}
}
