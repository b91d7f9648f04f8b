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

//! Integration tests for webhook delivery and verification

use std::sync::Arc;

use gsalary_sdk::api::ResultStatus;
use gsalary_sdk::webhook::{
	AuthTokenData, ResponseCode, TypedEvent, business_type, sign_webhook_body,
};
use gsalary_sdk::{GSalaryConfig, WebhookVerifier};
use rsa::RsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use serde_json::json;

const PRIVATE_PEM: &str = include_str!("fixtures/client_private_key.pem");
const PUBLIC_PEM: &str = include_str!("fixtures/client_public_key.pem");
const OTHER_PRIVATE_PEM: &str = include_str!("fixtures/other_private_key.pem");

fn verifier() -> WebhookVerifier {
	let config = GSalaryConfig::new("app1")
		.with_server_public_key_pem(PUBLIC_PEM)
		.unwrap();
	WebhookVerifier::new(Arc::new(config))
}

fn delivery(pem: &str) -> (String, Vec<u8>) {
	let body = serde_json::to_vec(&json!({
		"app_id": "app1",
		"business_type": business_type::ACQUIRING_AUTH_TOKEN,
		"timestamp": 1700000000000i64,
		"data": {
			"auth_state": "auth-1",
			"access_token": "at",
			"status": "ACTIVE",
		},
	}))
	.unwrap();
	let key = RsaPrivateKey::from_pkcs8_pem(pem).unwrap();
	let header = sign_webhook_body(&key, &body, "1700000000000")
		.unwrap()
		.to_header_value();
	(header, body)
}

#[test]
fn test_accepts_platform_delivery() {
	let (header, body) = delivery(PRIVATE_PEM);

	let (result, response) = verifier().handle(Some(header.as_str()), &body);
	assert_eq!(response.result, ResultStatus::Success);
	assert_eq!(response.code, ResponseCode::Success);

	let event = result.unwrap();
	let token: AuthTokenData = event.payload().unwrap();
	assert_eq!(token.auth_state, "auth-1");
	assert!(matches!(event.typed().unwrap(), TypedEvent::AuthToken(_)));
}

#[test]
fn test_rejects_forged_delivery() {
	let (header, body) = delivery(OTHER_PRIVATE_PEM);

	let (result, response) = verifier().handle(Some(header.as_str()), &body);
	assert!(result.is_err());
	assert_eq!(response.result, ResultStatus::Failure);
	assert_eq!(response.code, ResponseCode::SignatureVerificationFailed);
}

#[test]
fn test_signature_covers_exact_bytes() {
	let (header, body) = delivery(PRIVATE_PEM);
	let mut reformatted: serde_json::Value = serde_json::from_slice(&body).unwrap();
	reformatted["timestamp"] = json!(1700000000000i64);
	let pretty = serde_json::to_vec_pretty(&reformatted).unwrap();

	// Same logical JSON, different bytes.
	let (result, _) = verifier().handle(Some(header.as_str()), &pretty);
	assert!(result.is_err());
}
