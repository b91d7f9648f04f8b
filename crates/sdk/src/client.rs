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

//! Signed request transport
//!
//! One call runs `validate -> sign -> serialize -> dispatch -> read -> verify
//! (HTTP 200 only) -> decode`. There is a single attempt per call; timeouts
//! belong to the underlying HTTP client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::canonical::body_hash;
use crate::config::{ConfigError, GSalaryConfig};
use crate::header::{AUTHORIZATION_HEADER, AuthorizationHeader};
use crate::request::{GSalaryRequest, Method, RequestError};
use crate::signing::{SignatureAlgorithm, SigningError, sign_message, verify_message};

/// Default HTTP timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the merchant application ID
pub const APP_ID_HEADER: &str = "X-Appid";

/// Business failure reported by the platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BusinessError {
	/// Business result code
	#[serde(rename = "biz_result", default)]
	pub code: String,
	/// Detailed error code
	#[serde(rename = "error_code", default)]
	pub sub_code: String,
	#[serde(default)]
	pub message: String,
}

impl BusinessError {
	fn is_empty(&self) -> bool {
		self.code.is_empty() && self.sub_code.is_empty() && self.message.is_empty()
	}
}

impl fmt::Display for BusinessError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{} - {}] {}", self.code, self.sub_code, self.message)
	}
}

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
	#[error(transparent)]
	Request(#[from] RequestError),
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Signing(#[from] SigningError),
	#[error("Network error: {0}")]
	Network(String),
	#[error("Invalid authorization header in response: {0}")]
	SignatureFormat(String),
	#[error("Response signature verification failed")]
	SignatureMismatch,
	#[error("Business error: {0}")]
	Business(BusinessError),
	#[error("Request still processing: {0}")]
	Pending(BusinessError),
	#[error("HTTP {status}: {body}")]
	Http { status: u16, body: String },
	#[error("Invalid response: {0}")]
	Decode(String),
}

/// Request handed to an [`HttpExchange`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
	pub method: Method,
	/// Absolute URL with the escaped query string
	pub url: String,
	pub headers: Vec<(&'static str, String)>,
	pub body: Option<Vec<u8>>,
}

impl HttpRequest {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Raw response from an [`HttpExchange`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
	pub status: u16,
	/// Value of the `Authorization` response header, if any
	pub authorization: Option<String>,
	/// Body bytes exactly as received
	pub body: Vec<u8>,
}

/// Sends one HTTP request and returns the raw response
#[async_trait]
pub trait HttpExchange: Send + Sync {
	async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

/// [`HttpExchange`] backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestExchange {
	client: ReqwestClient,
}

impl ReqwestExchange {
	pub fn new(timeout: Duration) -> Result<Self, ClientError> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self { client })
	}
}

#[async_trait]
impl HttpExchange for ReqwestExchange {
	async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
		let mut builder = self.client.request(request.method.into(), &request.url);
		for (name, value) in &request.headers {
			builder = builder.header(*name, value);
		}
		if let Some(body) = request.body {
			builder = builder.body(body);
		}

		let response = builder
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e)))?;

		let status = response.status().as_u16();
		let authorization = response
			.headers()
			.get(AUTHORIZATION_HEADER)
			.and_then(|value| value.to_str().ok())
			.map(str::to_string);
		let body = response
			.bytes()
			.await
			.map_err(|e| ClientError::Network(format!("Failed to read response body: {}", e)))?
			.to_vec();

		Ok(HttpResponse {
			status,
			authorization,
			body,
		})
	}
}

/// Anything that can run a signed API call
///
/// Resource wrappers in [`crate::api`] only depend on this trait.
#[async_trait]
pub trait Transport: Send + Sync {
	async fn request(&self, request: GSalaryRequest) -> Result<Map<String, Value>, ClientError>;
}

/// Client for the GSalary open API
#[derive(Clone)]
pub struct Client {
	config: Arc<GSalaryConfig>,
	exchange: Arc<dyn HttpExchange>,
}

impl fmt::Debug for Client {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Client")
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}

impl Client {
	/// Create a client with the default timeout
	pub fn new(config: Arc<GSalaryConfig>) -> Result<Self, ClientError> {
		Self::with_timeout(config, DEFAULT_TIMEOUT)
	}

	/// Create a client with a custom HTTP timeout
	pub fn with_timeout(config: Arc<GSalaryConfig>, timeout: Duration) -> Result<Self, ClientError> {
		let exchange = ReqwestExchange::new(timeout)?;
		Ok(Self::with_exchange(config, exchange))
	}

	/// Create a client over any HTTP implementation
	pub fn with_exchange(config: Arc<GSalaryConfig>, exchange: impl HttpExchange + 'static) -> Self {
		Self {
			config,
			exchange: Arc::new(exchange),
		}
	}

	pub fn config(&self) -> &GSalaryConfig {
		&self.config
	}

	/// Build the authorization header for a request.
	///
	/// `body` must be the exact bytes that will be sent.
	pub fn sign_request(
		&self,
		request: &GSalaryRequest,
		body: Option<&[u8]>,
		timestamp: &str,
	) -> Result<AuthorizationHeader, ClientError> {
		let private_key = self.config.credentials.client_private_key()?;
		let sign_base = request.sign_base(
			&self.config.app_id,
			timestamp,
			&GSalaryRequest::body_hash_of(body),
		);
		debug!(sign_base = %sign_base.escape_debug(), "Signing request");

		let signature = sign_message(private_key, sign_base.as_bytes())?;
		Ok(AuthorizationHeader::new(
			SignatureAlgorithm::Rsa2.as_str(),
			timestamp,
			signature,
		))
	}

	/// Check a response signature against the request it answers.
	///
	/// The body hash is always computed over the raw response bytes.
	pub fn verify_response(
		&self,
		request: &GSalaryRequest,
		header: &AuthorizationHeader,
		body: &[u8],
	) -> Result<bool, ClientError> {
		let public_key = self.config.credentials.server_public_key()?;
		let sign_base = request.sign_base(&self.config.app_id, &header.timestamp, &body_hash(body));

		Ok(verify_message(
			public_key,
			sign_base.as_bytes(),
			&header.signature,
		))
	}

	fn decode_error(status: u16, body: &[u8]) -> ClientError {
		match serde_json::from_slice::<BusinessError>(body) {
			Ok(error) if !error.is_empty() => ClientError::Business(error),
			_ => ClientError::Http {
				status,
				body: String::from_utf8_lossy(body).into_owned(),
			},
		}
	}
}

#[async_trait]
impl Transport for Client {
	async fn request(&self, request: GSalaryRequest) -> Result<Map<String, Value>, ClientError> {
		let method = request.validate()?;
		// Both keys are needed for a complete round trip.
		self.config.credentials.server_public_key()?;

		let body = request.serialized_body()?;
		let timestamp = chrono::Utc::now().timestamp_millis().to_string();
		let header = self.sign_request(&request, body.as_deref(), &timestamp)?;

		let http_request = HttpRequest {
			method,
			url: self.config.concat_path(&request.path_with_query(true)),
			headers: vec![
				(APP_ID_HEADER, self.config.app_id.clone()),
				("Content-Type", "application/json".to_string()),
				(AUTHORIZATION_HEADER, header.to_header_value()),
			],
			body,
		};
		debug!(method = %method, url = %http_request.url, "Dispatching request");

		let response = self.exchange.exchange(http_request).await?;
		debug!(status = response.status, "Received response");

		if response.status != 200 {
			let error = Self::decode_error(response.status, &response.body);
			warn!(status = response.status, error = %error, "Request failed");
			return Err(error);
		}

		let response_header =
			AuthorizationHeader::parse(response.authorization.as_deref().unwrap_or_default());
		if !response_header.is_valid() {
			warn!(path = %request.path, "Response is missing a valid authorization header");
			return Err(ClientError::SignatureFormat(
				response.authorization.unwrap_or_default(),
			));
		}

		if !self.verify_response(&request, &response_header, &response.body)? {
			warn!(path = %request.path, "Response signature verification failed");
			return Err(ClientError::SignatureMismatch);
		}

		match serde_json::from_slice::<Value>(&response.body) {
			Ok(Value::Object(map)) => Ok(map),
			Ok(other) => Err(ClientError::Decode(format!(
				"expected a JSON object, got {}",
				other
			))),
			Err(e) => Err(ClientError::Decode(format!("Failed to parse response: {}", e))),
		}
	}
}

/// Blocking front for callers without an async runtime
///
/// Owns a private multi-threaded runtime; must not be called from inside
/// another tokio runtime.
pub struct SyncClient {
	client: Client,
	runtime: tokio::runtime::Runtime,
}

impl SyncClient {
	pub fn new(config: Arc<GSalaryConfig>) -> anyhow::Result<Self> {
		let runtime = tokio::runtime::Runtime::new()
			.map_err(|e| anyhow::anyhow!("Failed to create tokio runtime: {}", e))?;
		Ok(Self {
			client: Client::new(config)?,
			runtime,
		})
	}

	pub fn client(&self) -> &Client {
		&self.client
	}

	/// Run one signed request to completion
	pub fn request(&self, request: GSalaryRequest) -> Result<Map<String, Value>, ClientError> {
		self.runtime.block_on(self.client.request(request))
	}
}
