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

//! Inbound webhook verification
//!
//! The platform pushes events as a signed JSON envelope:
//!
//! ```json
//! {"app_id": "...", "business_type": "CARD_TRANSACTION", "timestamp": 1700000000000, "data": {...}}
//! ```
//!
//! The `Authorization` header uses the same codec as API responses, but the
//! signature covers the raw body bytes only. [`WebhookVerifier`] checks it
//! against the server public key before anything is decoded.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rsa::RsaPrivateKey;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::ResultStatus;
use crate::api::card::{BalanceModifyResult, CardTransaction};
use crate::api::exchange::ExchangeOrder;
use crate::api::remittance::RemittanceOrder;
use crate::config::{ConfigError, GSalaryConfig};
use crate::header::AuthorizationHeader;
use crate::signing::{SignatureAlgorithm, SigningError, sign_message, verify_message};

/// Webhook business types
pub mod business_type {
	pub const ACQUIRING_PAYMENT_RESULT: &str = "ACQUIRING_PAYMENT_RESULT";
	pub const ACQUIRING_AUTH_TOKEN: &str = "ACQUIRING_AUTH_TOKEN";
	pub const CARD_APPLY_RESULT: &str = "CARD_APPLY_RESULT";
	pub const CARD_STATUS_UPDATE: &str = "CARD_STATUS_UPDATE";
	pub const CARD_TRANSACTION: &str = "CARD_TRANSACTION";
	pub const CARD_ADJUST_RESULT: &str = "CARD_ADJUST_RESULT";
	pub const EXCHANGE_ORDER_RESULT: &str = "EXCHANGE_ORDER_RESULT";
	pub const REMITTANCE_ORDER_RESULT: &str = "REMITTANCE_ORDER_RESULT";
	pub const PAYEE_DEACTIVATED: &str = "PAYEE_DEACTIVATED";
}

/// Error types for webhook handling
#[derive(Debug, Error)]
pub enum WebhookError {
	#[error("Missing authorization header")]
	MissingHeader,
	#[error("Unsupported signature algorithm: {0:?}")]
	UnsupportedAlgorithm(String),
	#[error("Missing signature")]
	MissingSignature,
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error("Signature verification failed")]
	VerificationFailed,
	#[error("Timestamp outside replay window: {0}")]
	StaleTimestamp(String),
	#[error("Invalid JSON: {0}")]
	InvalidJson(String),
	#[error("Business type mismatch: expected {expected}, got {actual}")]
	BusinessTypeMismatch { expected: &'static str, actual: String },
	#[error("Failed to read body: {0}")]
	ReadBody(String),
}

impl WebhookError {
	pub fn code(&self) -> ResponseCode {
		match self {
			WebhookError::MissingHeader => ResponseCode::MissingSignature,
			WebhookError::UnsupportedAlgorithm(_)
			| WebhookError::MissingSignature
			| WebhookError::Config(_)
			| WebhookError::VerificationFailed
			| WebhookError::StaleTimestamp(_) => ResponseCode::SignatureVerificationFailed,
			WebhookError::InvalidJson(_) | WebhookError::BusinessTypeMismatch { .. } => {
				ResponseCode::InvalidJson
			}
			WebhookError::ReadBody(_) => ResponseCode::ReadBodyFailed,
		}
	}
}

/// `code` of a [`WebhookResponse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseCode {
	Success,
	MissingSignature,
	SignatureVerificationFailed,
	InvalidJson,
	ReadBodyFailed,
	MethodNotAllowed,
}

impl ResponseCode {
	pub const fn as_str(&self) -> &'static str {
		match self {
			ResponseCode::Success => "SUCCESS",
			ResponseCode::MissingSignature => "MISSING_SIGNATURE",
			ResponseCode::SignatureVerificationFailed => "SIGNATURE_VERIFICATION_FAILED",
			ResponseCode::InvalidJson => "INVALID_JSON",
			ResponseCode::ReadBodyFailed => "READ_BODY_FAILED",
			ResponseCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
		}
	}

	fn message(&self) -> &'static str {
		match self {
			ResponseCode::Success => "Webhook received successfully",
			ResponseCode::MissingSignature => "Missing authorization header",
			ResponseCode::SignatureVerificationFailed => "Signature verification failed",
			ResponseCode::InvalidJson => "Invalid JSON format",
			ResponseCode::ReadBodyFailed => "Failed to read request body",
			ResponseCode::MethodNotAllowed => "Method not allowed",
		}
	}
}

impl fmt::Display for ResponseCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Acknowledgement body returned to the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
	pub result: ResultStatus,
	pub code: ResponseCode,
	pub message: String,
}

impl WebhookResponse {
	pub fn success() -> Self {
		Self::with_code(ResultStatus::Success, ResponseCode::Success)
	}

	pub fn failure(code: ResponseCode) -> Self {
		Self::with_code(ResultStatus::Failure, code)
	}

	pub fn method_not_allowed() -> Self {
		Self::failure(ResponseCode::MethodNotAllowed)
	}

	pub fn is_success(&self) -> bool {
		self.result == ResultStatus::Success
	}

	fn with_code(result: ResultStatus, code: ResponseCode) -> Self {
		Self {
			result,
			code,
			message: code.message().to_string(),
		}
	}
}

impl From<&WebhookError> for WebhookResponse {
	fn from(error: &WebhookError) -> Self {
		Self::failure(error.code())
	}
}

/// Payload type bound to one business type
pub trait EventPayload: DeserializeOwned {
	const BUSINESS_TYPE: &'static str;
}

/// Verified webhook envelope
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
	pub app_id: String,
	pub business_type: String,
	/// Milliseconds since epoch
	pub timestamp: i64,
	pub data: Value,
	/// Authorization header the event arrived with
	pub signature_header: String,
}

#[derive(Deserialize)]
struct Envelope {
	#[serde(default)]
	app_id: String,
	#[serde(default)]
	business_type: String,
	#[serde(default)]
	timestamp: i64,
	#[serde(default)]
	data: Value,
}

impl WebhookEvent {
	/// Decode the payload as `T`, which must match the event's business type.
	pub fn payload<T: EventPayload>(&self) -> Result<T, WebhookError> {
		if self.business_type != T::BUSINESS_TYPE {
			return Err(WebhookError::BusinessTypeMismatch {
				expected: T::BUSINESS_TYPE,
				actual: self.business_type.clone(),
			});
		}
		self.decode_data()
	}

	/// Decode the payload according to the business type.
	pub fn typed(&self) -> Result<TypedEvent, WebhookError> {
		use business_type::*;

		let event = match self.business_type.as_str() {
			ACQUIRING_PAYMENT_RESULT => TypedEvent::PaymentResult(self.decode_data()?),
			ACQUIRING_AUTH_TOKEN => TypedEvent::AuthToken(self.decode_data()?),
			CARD_STATUS_UPDATE => TypedEvent::CardStatusUpdate(self.decode_data()?),
			CARD_TRANSACTION => TypedEvent::CardTransaction(self.decode_data()?),
			CARD_ADJUST_RESULT => TypedEvent::CardAdjustResult(self.decode_data()?),
			EXCHANGE_ORDER_RESULT => TypedEvent::ExchangeOrderResult(self.decode_data()?),
			REMITTANCE_ORDER_RESULT => TypedEvent::RemittanceOrderResult(self.decode_data()?),
			other => TypedEvent::Other {
				business_type: other.to_string(),
				data: self.data.clone(),
			},
		};
		Ok(event)
	}

	fn decode_data<T: DeserializeOwned>(&self) -> Result<T, WebhookError> {
		serde_json::from_value(self.data.clone()).map_err(|e| {
			WebhookError::InvalidJson(format!(
				"Failed to decode {} payload: {}",
				self.business_type, e
			))
		})
	}
}

/// Webhook payload decoded by business type
#[derive(Debug, Clone, PartialEq)]
pub enum TypedEvent {
	PaymentResult(PaymentResultData),
	AuthToken(AuthTokenData),
	CardStatusUpdate(CardStatusUpdateData),
	CardTransaction(CardTransactionData),
	CardAdjustResult(BalanceModifyResult),
	ExchangeOrderResult(ExchangeOrder),
	RemittanceOrderResult(RemittanceOrder),
	/// Known types without a typed payload, and unknown types
	Other { business_type: String, data: Value },
}

/// `ACQUIRING_PAYMENT_RESULT` payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentResultData {
	pub payment_request_id: String,
	pub payment_id: String,
	pub payment_amount: f64,
	pub payment_currency: String,
	/// `SUCCESS`, `FAIL` or `PROCESSING`
	pub payment_status: String,
	pub payment_result_code: String,
	/// Extra result fields such as `card_token`
	pub payment_result_info: Option<Map<String, Value>>,
	pub payment_time: String,
}

/// `ACQUIRING_AUTH_TOKEN` payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthTokenData {
	pub auth_state: String,
	pub access_token: String,
	pub access_token_expiry_time: String,
	pub refresh_token: String,
	pub refresh_token_expiry_time: String,
	pub user_login_id: String,
	pub payment_method_type: String,
	pub auth_client_id: String,
	/// `ACTIVE` or `REVOKED`
	pub status: String,
}

/// `CARD_STATUS_UPDATE` payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardStatusUpdateData {
	pub card_id: String,
	pub status: String,
	pub update_time: String,
}

/// `CARD_TRANSACTION` payload, same shape as a listed card transaction
pub type CardTransactionData = CardTransaction;

impl EventPayload for PaymentResultData {
	const BUSINESS_TYPE: &'static str = business_type::ACQUIRING_PAYMENT_RESULT;
}

impl EventPayload for AuthTokenData {
	const BUSINESS_TYPE: &'static str = business_type::ACQUIRING_AUTH_TOKEN;
}

impl EventPayload for CardStatusUpdateData {
	const BUSINESS_TYPE: &'static str = business_type::CARD_STATUS_UPDATE;
}

impl EventPayload for CardTransaction {
	const BUSINESS_TYPE: &'static str = business_type::CARD_TRANSACTION;
}

impl EventPayload for BalanceModifyResult {
	const BUSINESS_TYPE: &'static str = business_type::CARD_ADJUST_RESULT;
}

impl EventPayload for ExchangeOrder {
	const BUSINESS_TYPE: &'static str = business_type::EXCHANGE_ORDER_RESULT;
}

impl EventPayload for RemittanceOrder {
	const BUSINESS_TYPE: &'static str = business_type::REMITTANCE_ORDER_RESULT;
}

/// Verifies inbound webhooks against the server public key
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
	config: Arc<GSalaryConfig>,
	replay_window: Option<Duration>,
}

impl WebhookVerifier {
	pub fn new(config: Arc<GSalaryConfig>) -> Self {
		Self {
			config,
			replay_window: None,
		}
	}

	/// Reject events whose header time is further than `window` from now.
	pub fn with_replay_window(mut self, window: Duration) -> Self {
		self.replay_window = Some(window);
		self
	}

	/// Verify and decode one webhook.
	///
	/// `body` must be the exact bytes received.
	pub fn verify(
		&self,
		authorization: Option<&str>,
		body: &[u8],
	) -> Result<WebhookEvent, WebhookError> {
		self.verify_at(authorization, body, chrono::Utc::now().timestamp_millis())
	}

	/// [`WebhookVerifier::verify`] with an explicit clock, in milliseconds.
	pub fn verify_at(
		&self,
		authorization: Option<&str>,
		body: &[u8],
		now_ms: i64,
	) -> Result<WebhookEvent, WebhookError> {
		let raw_header = match authorization {
			Some(value) if !value.is_empty() => value,
			_ => {
				warn!("Webhook rejected: missing authorization header");
				return Err(WebhookError::MissingHeader);
			}
		};

		let header = AuthorizationHeader::parse(raw_header);
		if let Err(error) = self.check_signature(&header, body, now_ms) {
			warn!(error = %error, "Webhook rejected");
			return Err(error);
		}

		let envelope: Envelope = serde_json::from_slice(body).map_err(|e| {
			warn!(error = %e, "Webhook body is not a valid envelope");
			WebhookError::InvalidJson(e.to_string())
		})?;
		debug!(
			business_type = %envelope.business_type,
			timestamp = envelope.timestamp,
			"Webhook verified"
		);

		Ok(WebhookEvent {
			app_id: envelope.app_id,
			business_type: envelope.business_type,
			timestamp: envelope.timestamp,
			data: envelope.data,
			signature_header: raw_header.to_string(),
		})
	}

	/// Verify a webhook and build the acknowledgement for it.
	pub fn handle(
		&self,
		authorization: Option<&str>,
		body: &[u8],
	) -> (Result<WebhookEvent, WebhookError>, WebhookResponse) {
		let result = self.verify(authorization, body);
		let response = match &result {
			Ok(_) => WebhookResponse::success(),
			Err(error) => WebhookResponse::from(error),
		};
		(result, response)
	}

	fn check_signature(
		&self,
		header: &AuthorizationHeader,
		body: &[u8],
		now_ms: i64,
	) -> Result<(), WebhookError> {
		if SignatureAlgorithm::from_wire(&header.algorithm).is_none() {
			return Err(WebhookError::UnsupportedAlgorithm(header.algorithm.clone()));
		}
		if header.signature.is_empty() {
			return Err(WebhookError::MissingSignature);
		}
		if let Some(window) = self.replay_window {
			check_replay_window(&header.timestamp, window, now_ms)?;
		}

		let public_key = self.config.credentials.server_public_key()?;
		if !verify_message(public_key, body, &header.signature) {
			return Err(WebhookError::VerificationFailed);
		}
		Ok(())
	}
}

fn check_replay_window(timestamp: &str, window: Duration, now_ms: i64) -> Result<(), WebhookError> {
	let sent_ms: i64 = timestamp
		.parse()
		.map_err(|_| WebhookError::StaleTimestamp(timestamp.to_string()))?;
	let window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
	if now_ms.abs_diff(sent_ms) > window_ms {
		return Err(WebhookError::StaleTimestamp(timestamp.to_string()));
	}
	Ok(())
}

/// Sign a webhook body the way the platform does.
///
/// Useful for simulating deliveries against a receiver.
pub fn sign_webhook_body(
	private_key: &RsaPrivateKey,
	body: &[u8],
	timestamp: &str,
) -> Result<AuthorizationHeader, SigningError> {
	let signature = sign_message(private_key, body)?;
	Ok(AuthorizationHeader::new(
		SignatureAlgorithm::Rsa2.as_str(),
		timestamp,
		signature,
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rsa::pkcs8::DecodePrivateKey;
	use serde_json::json;

	const PRIVATE_PEM: &str = include_str!("../tests/fixtures/client_private_key.pem");
	const PUBLIC_PEM: &str = include_str!("../tests/fixtures/client_public_key.pem");
	const OTHER_PRIVATE_PEM: &str = include_str!("../tests/fixtures/other_private_key.pem");
	const NOW: i64 = 1_700_000_000_000;

	fn verifier() -> WebhookVerifier {
		let config = GSalaryConfig::new("app1")
			.with_server_public_key_pem(PUBLIC_PEM)
			.unwrap();
		WebhookVerifier::new(Arc::new(config))
	}

	fn signed(body: &[u8], pem: &str) -> String {
		let key = RsaPrivateKey::from_pkcs8_pem(pem).unwrap();
		sign_webhook_body(&key, body, &NOW.to_string())
			.unwrap()
			.to_header_value()
	}

	fn body(business_type: &str, data: Value) -> Vec<u8> {
		serde_json::to_vec(&json!({
			"app_id": "app1",
			"business_type": business_type,
			"timestamp": NOW,
			"data": data,
		}))
		.unwrap()
	}

	#[test]
	fn test_verify_signed_event() {
		let body = body(
			business_type::CARD_STATUS_UPDATE,
			json!({"card_id": "c1", "status": "FROZEN"}),
		);
		let header = signed(&body, PRIVATE_PEM);

		let event = verifier().verify_at(Some(header.as_str()), &body, NOW).unwrap();
		assert_eq!(event.app_id, "app1");
		assert_eq!(event.timestamp, NOW);
		assert_eq!(event.signature_header, header);

		let data: CardStatusUpdateData = event.payload().unwrap();
		assert_eq!(data.status, "FROZEN");
	}

	#[test]
	fn test_missing_header() {
		let body = body(business_type::CARD_TRANSACTION, json!({}));
		for header in [None, Some("")] {
			let (result, response) = verifier().handle(header, &body);
			assert!(matches!(result, Err(WebhookError::MissingHeader)));
			assert_eq!(response.code, ResponseCode::MissingSignature);
			assert_eq!(response.result, ResultStatus::Failure);
		}
	}

	#[test]
	fn test_wrong_key_is_rejected() {
		let body = body(business_type::CARD_TRANSACTION, json!({}));
		let header = signed(&body, OTHER_PRIVATE_PEM);

		let (result, response) = verifier().handle(Some(header.as_str()), &body);
		assert!(matches!(result, Err(WebhookError::VerificationFailed)));
		assert_eq!(response.code, ResponseCode::SignatureVerificationFailed);
		assert!(!response.is_success());
	}

	#[test]
	fn test_tampered_body_is_rejected() {
		let signed_body = body(business_type::CARD_TRANSACTION, json!({"amount": 1.0}));
		let header = signed(&signed_body, PRIVATE_PEM);
		let tampered = body(business_type::CARD_TRANSACTION, json!({"amount": 100.0}));

		let result = verifier().verify_at(Some(header.as_str()), &tampered, NOW);
		assert!(matches!(result, Err(WebhookError::VerificationFailed)));
	}

	#[test]
	fn test_unsupported_algorithm_and_empty_signature() {
		let body = body(business_type::CARD_TRANSACTION, json!({}));
		let header = signed(&body, PRIVATE_PEM).replacen("RSA2", "RSA", 1);
		assert!(matches!(
			verifier().verify_at(Some(header.as_str()), &body, NOW),
			Err(WebhookError::UnsupportedAlgorithm(_))
		));

		let header = "algorithm=RSA2,time=1,signature=";
		let error = verifier().verify_at(Some(header), &body, NOW).unwrap_err();
		assert!(matches!(error, WebhookError::MissingSignature));
		assert_eq!(error.code(), ResponseCode::SignatureVerificationFailed);

		// Anything but three segments parses to the empty header.
		let error = verifier()
			.verify_at(Some("algorithm=RSA2"), &body, NOW)
			.unwrap_err();
		assert!(matches!(error, WebhookError::UnsupportedAlgorithm(_)));
	}

	#[test]
	fn test_missing_public_key() {
		let body = body(business_type::CARD_TRANSACTION, json!({}));
		let header = signed(&body, PRIVATE_PEM);
		let verifier = WebhookVerifier::new(Arc::new(GSalaryConfig::new("app1")));

		let error = verifier.verify_at(Some(header.as_str()), &body, NOW).unwrap_err();
		assert!(matches!(
			error,
			WebhookError::Config(ConfigError::MissingPublicKey)
		));
		assert_eq!(error.code(), ResponseCode::SignatureVerificationFailed);
	}

	#[test]
	fn test_signed_garbage_is_invalid_json() {
		let body = b"not json";
		let header = signed(body, PRIVATE_PEM);

		let (result, response) = verifier().handle(Some(header.as_str()), body);
		assert!(matches!(result, Err(WebhookError::InvalidJson(_))));
		assert_eq!(response.code, ResponseCode::InvalidJson);
	}

	#[test]
	fn test_missing_business_type_is_accepted_untyped() {
		let body = serde_json::to_vec(&json!({
			"app_id": "app1",
			"timestamp": NOW,
			"data": {"k": "v"},
		}))
		.unwrap();
		let header = signed(&body, PRIVATE_PEM);

		let (result, response) = verifier().handle(Some(header.as_str()), &body);
		let event = result.unwrap();
		assert!(response.is_success());
		assert_eq!(event.business_type, "");
		assert_eq!(
			event.typed().unwrap(),
			TypedEvent::Other {
				business_type: String::new(),
				data: json!({"k": "v"}),
			}
		);
	}

	#[test]
	fn test_replay_window() {
		let body = body(business_type::CARD_TRANSACTION, json!({}));
		let header = signed(&body, PRIVATE_PEM);
		let verifier = verifier().with_replay_window(Duration::from_secs(300));

		assert!(verifier.verify_at(Some(header.as_str()), &body, NOW + 299_000).is_ok());
		assert!(verifier.verify_at(Some(header.as_str()), &body, NOW - 299_000).is_ok());
		assert!(matches!(
			verifier.verify_at(Some(header.as_str()), &body, NOW + 301_000),
			Err(WebhookError::StaleTimestamp(_))
		));
	}

	#[test]
	fn test_typed_events() {
		let event = WebhookEvent {
			app_id: "app1".to_string(),
			business_type: business_type::REMITTANCE_ORDER_RESULT.to_string(),
			timestamp: NOW,
			data: json!({"order_id": "o1", "status": "SUCCESS"}),
			signature_header: String::new(),
		};
		match event.typed().unwrap() {
			TypedEvent::RemittanceOrderResult(order) => assert_eq!(order.order_id, "o1"),
			other => panic!("unexpected: {:?}", other),
		}

		let event = WebhookEvent {
			business_type: business_type::PAYEE_DEACTIVATED.to_string(),
			data: json!({"payee_id": "pe1"}),
			..event
		};
		assert_eq!(
			event.typed().unwrap(),
			TypedEvent::Other {
				business_type: business_type::PAYEE_DEACTIVATED.to_string(),
				data: json!({"payee_id": "pe1"}),
			}
		);
	}

	#[test]
	fn test_payload_type_mismatch() {
		let event = WebhookEvent {
			app_id: "app1".to_string(),
			business_type: business_type::CARD_TRANSACTION.to_string(),
			timestamp: NOW,
			data: json!({"transaction_id": "t1", "amount": 12.5}),
			signature_header: String::new(),
		};
		let transaction: CardTransactionData = event.payload().unwrap();
		assert_eq!(transaction.amount, 12.5);

		let error = event.payload::<PaymentResultData>().unwrap_err();
		assert!(matches!(
			error,
			WebhookError::BusinessTypeMismatch { expected, .. }
				if expected == business_type::ACQUIRING_PAYMENT_RESULT
		));
	}

	#[test]
	fn test_response_serialization() {
		assert_eq!(
			serde_json::to_value(WebhookResponse::success()).unwrap(),
			json!({"result": "S", "code": "SUCCESS", "message": "Webhook received successfully"})
		);
		assert_eq!(
			serde_json::to_value(WebhookResponse::method_not_allowed()).unwrap()["code"],
			json!("METHOD_NOT_ALLOWED")
		);
	}
}
