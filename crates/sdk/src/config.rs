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

//! Endpoint and credential configuration
//!
//! [`GSalaryConfig`] is built once, then shared read-only (usually behind an
//! `Arc`) by the client and the webhook verifier. The SDK never reads the
//! environment; callers pass key material in explicitly.

use std::fmt;
use std::fs;
use std::path::Path;

use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use thiserror::Error;

/// Default API endpoint (sandbox)
pub const DEFAULT_ENDPOINT: &str = "https://api-test.gsalary.com";

const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";
const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";
const PEM_LINE_WIDTH: usize = 64;

/// Error types for configuration
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("Configuration error: client private key is not configured")]
	MissingPrivateKey,
	#[error("Configuration error: server public key is not configured")]
	MissingPublicKey,
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	#[error("IO error: {0}")]
	Io(String),
}

/// RSA key pair halves used by one merchant application
#[derive(Clone, Default)]
pub struct Credentials {
	client_private_key: Option<RsaPrivateKey>,
	server_public_key: Option<RsaPublicKey>,
}

impl Credentials {
	/// Key used to sign outbound requests
	pub fn client_private_key(&self) -> Result<&RsaPrivateKey, ConfigError> {
		self.client_private_key
			.as_ref()
			.ok_or(ConfigError::MissingPrivateKey)
	}

	/// Key used to verify responses and webhooks
	pub fn server_public_key(&self) -> Result<&RsaPublicKey, ConfigError> {
		self.server_public_key
			.as_ref()
			.ok_or(ConfigError::MissingPublicKey)
	}
}

// Never print key material.
impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credentials")
			.field("client_private_key", &self.client_private_key.is_some())
			.field("server_public_key", &self.server_public_key.is_some())
			.finish()
	}
}

/// SDK configuration
#[derive(Debug, Clone)]
pub struct GSalaryConfig {
	/// Base URL, e.g. `https://api.gsalary.com`
	pub endpoint: String,
	/// Merchant application ID, sent as `X-Appid` and signed
	pub app_id: String,
	pub credentials: Credentials,
}

impl Default for GSalaryConfig {
	fn default() -> Self {
		Self {
			endpoint: DEFAULT_ENDPOINT.to_string(),
			app_id: String::new(),
			credentials: Credentials::default(),
		}
	}
}

impl GSalaryConfig {
	pub fn new(app_id: impl Into<String>) -> Self {
		Self {
			app_id: app_id.into(),
			..Self::default()
		}
	}

	pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = endpoint.into();
		self
	}

	/// Load the client private key from PEM text or bare base64.
	///
	/// PKCS#8 is tried first, then PKCS#1.
	pub fn with_client_private_key_pem(mut self, pem: &str) -> Result<Self, ConfigError> {
		self.credentials.client_private_key = Some(parse_private_key(pem)?);
		Ok(self)
	}

	pub fn with_client_private_key_pem_file(
		self,
		path: impl AsRef<Path>,
	) -> Result<Self, ConfigError> {
		let pem = read_key_file(path.as_ref())?;
		self.with_client_private_key_pem(&pem)
	}

	/// Load the server public key from PEM text or bare base64.
	///
	/// SPKI is tried first, then PKCS#1.
	pub fn with_server_public_key_pem(mut self, pem: &str) -> Result<Self, ConfigError> {
		self.credentials.server_public_key = Some(parse_public_key(pem)?);
		Ok(self)
	}

	pub fn with_server_public_key_pem_file(
		self,
		path: impl AsRef<Path>,
	) -> Result<Self, ConfigError> {
		let pem = read_key_file(path.as_ref())?;
		self.with_server_public_key_pem(&pem)
	}

	/// Join the endpoint and a path with exactly one `/`.
	pub fn concat_path(&self, path: &str) -> String {
		let path = path.strip_prefix('/').unwrap_or(path);
		if self.endpoint.ends_with('/') {
			format!("{}{}", self.endpoint, path)
		} else {
			format!("{}/{}", self.endpoint, path)
		}
	}
}

fn read_key_file(path: &Path) -> Result<String, ConfigError> {
	fs::read_to_string(path)
		.map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))
}

fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, ConfigError> {
	let armored = normalize_pem(pem, PRIVATE_KEY_LABEL);
	if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(&armored) {
		return Ok(key);
	}

	let pkcs1 = if has_armor(pem) {
		armored
	} else {
		normalize_pem(pem, "RSA PRIVATE KEY")
	};
	RsaPrivateKey::from_pkcs1_pem(&pkcs1)
		.map_err(|e| ConfigError::InvalidKey(format!("Failed to parse private key: {}", e)))
}

fn parse_public_key(pem: &str) -> Result<RsaPublicKey, ConfigError> {
	let armored = normalize_pem(pem, PUBLIC_KEY_LABEL);
	if let Ok(key) = RsaPublicKey::from_public_key_pem(&armored) {
		return Ok(key);
	}

	let pkcs1 = if has_armor(pem) {
		armored
	} else {
		normalize_pem(pem, "RSA PUBLIC KEY")
	};
	RsaPublicKey::from_pkcs1_pem(&pkcs1)
		.map_err(|e| ConfigError::InvalidKey(format!("Failed to parse public key: {}", e)))
}

fn has_armor(value: &str) -> bool {
	value.trim_start().starts_with("-----BEGIN ")
}

/// Turn key text into parseable PEM.
///
/// Armored input is returned trimmed. Bare base64 is folded at 64 columns
/// when it is a single line, then wrapped in `label` armor.
pub fn normalize_pem(value: &str, label: &str) -> String {
	let value = value.trim();
	if has_armor(value) {
		return format!("{}\n", value);
	}

	let body = if value.contains('\n') {
		value.to_string()
	} else {
		value
			.as_bytes()
			.chunks(PEM_LINE_WIDTH)
			.map(|chunk| String::from_utf8_lossy(chunk).into_owned())
			.collect::<Vec<_>>()
			.join("\n")
	};

	format!("-----BEGIN {label}-----\n{body}\n-----END {label}-----\n")
}

#[cfg(test)]
mod tests {
	use super::*;

	const PRIVATE_PEM: &str = include_str!("../tests/fixtures/client_private_key.pem");
	const PRIVATE_PKCS1_PEM: &str = include_str!("../tests/fixtures/client_private_key_pkcs1.pem");
	const PUBLIC_PEM: &str = include_str!("../tests/fixtures/client_public_key.pem");

	fn strip_armor(pem: &str) -> String {
		pem.lines()
			.filter(|line| !line.starts_with("-----"))
			.collect::<String>()
	}

	#[test]
	fn test_default_config() {
		let config = GSalaryConfig::new("app1");
		assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
		assert_eq!(config.app_id, "app1");
		assert!(matches!(
			config.credentials.client_private_key(),
			Err(ConfigError::MissingPrivateKey)
		));
		assert!(matches!(
			config.credentials.server_public_key(),
			Err(ConfigError::MissingPublicKey)
		));
	}

	#[test]
	fn test_concat_path() {
		for endpoint in ["https://api.example.com", "https://api.example.com/"] {
			let config = GSalaryConfig::new("app1").with_endpoint(endpoint);
			assert_eq!(
				config.concat_path("/v1/cards"),
				"https://api.example.com/v1/cards"
			);
			assert_eq!(
				config.concat_path("v1/cards"),
				"https://api.example.com/v1/cards"
			);
		}
	}

	#[test]
	fn test_load_armored_keys() {
		let config = GSalaryConfig::new("app1")
			.with_client_private_key_pem(PRIVATE_PEM)
			.unwrap()
			.with_server_public_key_pem(PUBLIC_PEM)
			.unwrap();
		assert!(config.credentials.client_private_key().is_ok());
		assert!(config.credentials.server_public_key().is_ok());
	}

	#[test]
	fn test_load_bare_base64_keys() {
		let private = strip_armor(PRIVATE_PEM);
		let public = strip_armor(PUBLIC_PEM);
		assert!(!private.contains('\n'));

		let config = GSalaryConfig::new("app1")
			.with_client_private_key_pem(&private)
			.unwrap()
			.with_server_public_key_pem(&public)
			.unwrap();
		let expected = RsaPrivateKey::from_pkcs8_pem(PRIVATE_PEM).unwrap();
		assert_eq!(config.credentials.client_private_key().unwrap(), &expected);
	}

	#[test]
	fn test_load_pkcs1_private_key() {
		let config = GSalaryConfig::new("app1")
			.with_client_private_key_pem(PRIVATE_PKCS1_PEM)
			.unwrap();
		let expected = RsaPrivateKey::from_pkcs8_pem(PRIVATE_PEM).unwrap();
		assert_eq!(config.credentials.client_private_key().unwrap(), &expected);

		let bare = strip_armor(PRIVATE_PKCS1_PEM);
		assert!(GSalaryConfig::new("app1")
			.with_client_private_key_pem(&bare)
			.is_ok());
	}

	#[test]
	fn test_reject_garbage_key() {
		let result = GSalaryConfig::new("app1").with_client_private_key_pem("not a key");
		assert!(matches!(result, Err(ConfigError::InvalidKey(_))));
		let result = GSalaryConfig::new("app1").with_server_public_key_pem(PRIVATE_PEM);
		assert!(matches!(result, Err(ConfigError::InvalidKey(_))));
	}

	#[test]
	fn test_missing_key_file() {
		let result = GSalaryConfig::new("app1")
			.with_client_private_key_pem_file("/nonexistent/gsalary/key.pem");
		assert!(matches!(result, Err(ConfigError::Io(_))));
	}

	#[test]
	fn test_normalize_pem_folds_single_line() {
		let bare = "A".repeat(130);
		let pem = normalize_pem(&bare, PUBLIC_KEY_LABEL);
		let lines: Vec<&str> = pem.lines().collect();
		assert_eq!(lines[0], "-----BEGIN PUBLIC KEY-----");
		assert_eq!(lines[1].len(), 64);
		assert_eq!(lines[2].len(), 64);
		assert_eq!(lines[3].len(), 2);
		assert_eq!(lines[4], "-----END PUBLIC KEY-----");
	}

	#[test]
	fn test_debug_hides_key_material() {
		let config = GSalaryConfig::new("app1")
			.with_client_private_key_pem(PRIVATE_PEM)
			.unwrap();
		let debug = format!("{:?}", config);
		assert!(debug.contains("client_private_key: true"));
		assert!(!debug.contains("BEGIN"));
	}
}
