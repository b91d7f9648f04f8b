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

//! Acquiring: hosted checkout sessions, wallet authorization (Easy Safe Pay),
//! card auto debit, token lifecycle, cancellation and payment queries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Ack, Outcome, call, call_outcome};
use crate::client::{ClientError, Transport};
use crate::request::GSalaryRequest;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentConsultRequest {
	pub mch_app_id: String,
	pub payment_currency: String,
	pub payment_amount: f64,
	pub settlement_currency: String,
	pub allowed_payment_method_regions: Vec<String>,
	pub allowed_payment_methods: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_region: Option<String>,
	/// `WEB`, `WAP` or `APP`
	pub env_terminal_type: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub env_os_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub env_client_ip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountLimit {
	pub min: f64,
	pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentOption {
	pub payment_method_type: String,
	pub currency: String,
	pub limit: AmountLimit,
	pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentOptions {
	pub payment_options: Vec<PaymentOption>,
}

/// Merchant order attached to a payment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderInfo {
	pub reference_order_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub order_description: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub order_currency: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub order_amount: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub order_buyer_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub order_buyer_email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentSessionRequest {
	pub mch_app_id: String,
	pub payment_request_id: String,
	pub payment_currency: String,
	pub payment_amount: f64,
	pub payment_method_type: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub payment_session_expiry_time: Option<String>,
	pub payment_redirect_url: String,
	pub order: OrderInfo,
	pub settlement_currency: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub env_client_ip: Option<String>,
	pub product_scene: String,
}

/// First payment with wallet authorization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EasySafePaySessionRequest {
	#[serde(flatten)]
	pub session: PaymentSessionRequest,
	/// Merchant-generated authorization ID
	pub auth_state: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_login_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSession {
	pub payment_session_data: String,
	pub payment_session_expiry_time: String,
	pub payment_session_id: String,
	pub normal_url: String,
}

/// Payment with an already authorized payment method
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedPayRequest {
	pub mch_app_id: String,
	pub payment_request_id: String,
	pub payment_currency: String,
	pub payment_amount: f64,
	pub payment_method_id: String,
	pub payment_method_type: String,
	pub payment_redirect_url: String,
	pub order: OrderInfo,
	pub settlement_currency: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub env_client_ip: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub payment_expiry_time: Option<String>,
	pub env_terminal_type: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub env_os_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentReceipt {
	pub payment_request_id: String,
	pub payment_id: String,
	pub payment_currency: String,
	pub payment_amount: f64,
	pub normal_url: String,
	pub scheme_url: String,
	pub applink_url: String,
	pub app_identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
	pub mch_app_id: String,
	pub refresh_token: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub merchant_region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthToken {
	pub access_token: String,
	pub access_token_expiry_time: String,
	pub refresh_token: String,
	pub refresh_token_expiry_time: String,
	pub user_login_id: String,
}

/// Identifies a payment by merchant request ID, platform ID or both
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRef {
	pub mch_app_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub payment_request_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub payment_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CancelResult {
	pub payment_request_id: String,
	pub payment_id: String,
	pub cancel_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentDetail {
	pub payment_request_id: String,
	pub payment_id: String,
	pub payment_amount: f64,
	pub payment_currency: String,
	/// `SUCCESS`, `FAIL` or `PROCESSING`
	pub payment_status: String,
	pub payment_method_type: String,
	pub payment_create_time: String,
	pub payment_update_time: String,
	pub payment_result_code: String,
	pub payment_result_info: Option<Map<String, Value>>,
}

/// Acquiring endpoints
#[derive(Clone)]
pub struct PaymentApi {
	transport: Arc<dyn Transport>,
}

impl PaymentApi {
	pub fn new(transport: Arc<dyn Transport>) -> Self {
		Self { transport }
	}

	/// Payment methods available for an amount
	pub async fn consult(&self, req: &PaymentConsultRequest) -> Result<PaymentOptions, ClientError> {
		let request = GSalaryRequest::post("/gateway/v1/acquiring/pay_consult").json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn create_session(
		&self,
		req: &PaymentSessionRequest,
	) -> Result<PaymentSession, ClientError> {
		let request = GSalaryRequest::post("/gateway/v1/acquiring/pay_session").json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn easy_safe_pay_session(
		&self,
		req: &EasySafePaySessionRequest,
	) -> Result<PaymentSession, ClientError> {
		let request = GSalaryRequest::post("/gateway/v1/acquiring/easy_safe_pay/pay_session")
			.json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn easy_safe_pay(
		&self,
		req: &AuthorizedPayRequest,
	) -> Result<PaymentReceipt, ClientError> {
		let request =
			GSalaryRequest::post("/gateway/v1/acquiring/easy_safe_pay/pay").json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn card_auto_debit_session(
		&self,
		req: &PaymentSessionRequest,
	) -> Result<PaymentSession, ClientError> {
		let request = GSalaryRequest::post("/gateway/v1/acquiring/card_auto_debit/pay_session")
			.json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn card_auto_debit_pay(
		&self,
		req: &AuthorizedPayRequest,
	) -> Result<PaymentReceipt, ClientError> {
		let request =
			GSalaryRequest::post("/gateway/v1/acquiring/card_auto_debit/pay").json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn refresh_token(&self, req: &RefreshTokenRequest) -> Result<AuthToken, ClientError> {
		let request =
			GSalaryRequest::post("/gateway/v1/acquiring/auth_refresh_token").json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn revoke_token(
		&self,
		mch_app_id: &str,
		access_token: &str,
	) -> Result<Outcome<Ack>, ClientError> {
		let request = GSalaryRequest::post("/gateway/v1/acquiring/auth_revoke_token")
			.body_field("mch_app_id", mch_app_id)
			.body_field("access_token", access_token);
		call_outcome(self.transport.as_ref(), request).await
	}

	pub async fn cancel(&self, payment: &PaymentRef) -> Result<Outcome<CancelResult>, ClientError> {
		let request = GSalaryRequest::post("/gateway/v1/acquiring/cancel").json_body(payment)?;
		call_outcome(self.transport.as_ref(), request).await
	}

	pub async fn query(&self, payment: &PaymentRef) -> Result<PaymentDetail, ClientError> {
		let request = GSalaryRequest::get("/gateway/v1/acquiring/query")
			.query_arg("mch_app_id", &payment.mch_app_id)
			.query_arg_opt("payment_request_id", payment.payment_request_id.as_ref())
			.query_arg_opt("payment_id", payment.payment_id.as_ref());
		call(self.transport.as_ref(), request).await
	}
}
