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

//! Card issuing: applications, card management, balance adjustments and bills

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Ack, Outcome, Pagination, call, call_outcome};
use crate::client::{ClientError, Transport};
use crate::request::GSalaryRequest;

/// Request to apply for a new card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardApplyRequest {
	/// Unique merchant request ID, at most 50 characters
	pub request_id: String,
	pub product_code: String,
	/// ISO-4217 card currency
	pub currency: String,
	pub card_holder_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub limit_per_day: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub limit_per_month: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub limit_per_transaction: Option<f64>,
	pub init_balance: f64,
}

/// Accepted card application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardApplyReceipt {
	pub request_id: String,
	pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableQuotasRequest {
	pub currency: String,
	/// `SHARE` (default) or `RECHARGE`
	pub accounting_card_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailableQuota {
	pub currency: String,
	pub accounting_card_type: String,
	pub available_quota: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardProductsRequest {
	/// `PHYSICAL` or `VIRTUAL`
	pub card_type: Option<String>,
	/// `VISA` or `MASTER`
	pub brand_code: Option<String>,
	pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardProduct {
	pub product_code: String,
	pub product_name: String,
	pub card_type: String,
	pub brand_code: String,
	pub currency: String,
	pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardProducts {
	pub products: Vec<CardProduct>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardListRequest {
	/// Starts at 1
	pub page: Option<u32>,
	pub limit: Option<u32>,
	pub product_code: Option<String>,
	pub brand_code: Option<String>,
	pub card_holder_id: Option<String>,
	/// ISO-8601, inclusive
	pub create_start: Option<String>,
	pub create_end: Option<String>,
	pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Card {
	pub card_id: String,
	pub product_code: String,
	pub brand_code: String,
	pub card_holder_id: String,
	pub status: String,
	pub created_at: String,
	pub updated_at: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub extra: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardList {
	pub cards: Vec<Card>,
	#[serde(flatten)]
	pub pagination: Pagination,
}

/// Full card details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardInfo {
	pub card_id: String,
	pub card_name: String,
	pub mask_card_number: String,
	pub card_currency: String,
	pub available_balance: f64,
	pub brand_code: String,
	pub status: String,
	pub card_type: String,
	pub accounting_type: String,
	pub card_region: String,
	pub card_holder_id: String,
	pub first_name: String,
	pub last_name: String,
	pub mobile: Option<Value>,
	pub email: String,
	pub limit_per_day: f64,
	pub limit_per_month: f64,
	pub limit_per_transaction: f64,
	pub bill_address: Option<Value>,
	pub support_tds_trans: bool,
	pub create_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCardRequest {
	#[serde(skip)]
	pub card_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub card_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub limit_per_day: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub limit_per_month: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub limit_per_transaction: Option<f64>,
}

/// Sensitive card data. Do not log.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSecureInfo {
	pub pan: String,
	pub expire_year: String,
	pub expire_month: String,
	pub cvv: String,
}

impl std::fmt::Debug for CardSecureInfo {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CardSecureInfo").finish_non_exhaustive()
	}
}

/// Direction of a balance adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceModifyType {
	Increase,
	Decrease,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustBalanceRequest {
	pub card_id: String,
	pub amount: f64,
	#[serde(rename = "type")]
	pub modify_type: BalanceModifyType,
	pub request_id: String,
}

/// Balance adjustment state, also delivered as a `CARD_ADJUST_RESULT` webhook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceModifyResult {
	pub gsalary_request_id: String,
	pub request_id: String,
	pub card_id: String,
	pub status: String,
	pub create_time: String,
	pub finish_time: String,
	pub amount: f64,
	#[serde(rename = "type")]
	pub modify_type: String,
	pub post_balance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTransactionsRequest {
	pub page: u32,
	pub limit: u32,
	pub transaction_id: Option<String>,
	pub mch_request_id: Option<String>,
	pub time_start: Option<String>,
	pub time_end: Option<String>,
	pub card_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardTransaction {
	pub transaction_id: String,
	pub card_id: String,
	pub transaction_type: String,
	pub amount: f64,
	pub currency: String,
	pub status: String,
	pub status_description: String,
	pub transaction_time: String,
	pub merchant_name: String,
	pub merchant_country: String,
	pub merchant_category_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardTransactions {
	pub query: Option<Value>,
	pub transactions: Vec<CardTransaction>,
	#[serde(flatten)]
	pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceHistoryRequest {
	pub page: u32,
	pub limit: u32,
	pub transaction_id: Option<String>,
	pub log_id: Option<String>,
	pub time_start: Option<String>,
	pub time_end: Option<String>,
	pub card_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceHistoryRecord {
	pub log_id: String,
	pub card_id: String,
	pub transaction_id: String,
	pub amount: f64,
	pub post_balance: f64,
	pub transaction_type: String,
	pub create_time: String,
	pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceHistory {
	pub query: Option<Value>,
	pub history: Vec<BalanceHistoryRecord>,
	#[serde(flatten)]
	pub pagination: Pagination,
}

/// Card issuing endpoints
#[derive(Clone)]
pub struct CardApi {
	transport: Arc<dyn Transport>,
}

impl CardApi {
	pub fn new(transport: Arc<dyn Transport>) -> Self {
		Self { transport }
	}

	/// Apply for a new card. Issuing is asynchronous; poll [`CardApi::apply_result`].
	pub async fn apply_card(&self, req: &CardApplyRequest) -> Result<CardApplyReceipt, ClientError> {
		let request = GSalaryRequest::post("/v1/card_applies").json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn available_quotas(
		&self,
		req: &AvailableQuotasRequest,
	) -> Result<AvailableQuota, ClientError> {
		let request = GSalaryRequest::get("/v1/cards/available_quotas")
			.query_arg("currency", &req.currency)
			.query_arg_opt("accounting_card_type", req.accounting_card_type.as_ref());
		call(self.transport.as_ref(), request).await
	}

	pub async fn products(&self, req: &CardProductsRequest) -> Result<CardProducts, ClientError> {
		let request = GSalaryRequest::get("/v1/card_support/products")
			.query_arg_opt("card_type", req.card_type.as_ref())
			.query_arg_opt("brand_code", req.brand_code.as_ref())
			.query_arg_opt("currency", req.currency.as_ref());
		call(self.transport.as_ref(), request).await
	}

	/// Result of an earlier application, as returned by the platform
	pub async fn apply_result(&self, request_id: &str) -> Result<Map<String, Value>, ClientError> {
		let request = GSalaryRequest::get(format!("/v1/card_applies/{}", request_id));
		call(self.transport.as_ref(), request).await
	}

	pub async fn list_cards(&self, req: &CardListRequest) -> Result<CardList, ClientError> {
		let request = GSalaryRequest::get("/v1/cards")
			.query_arg_opt("page", req.page)
			.query_arg_opt("limit", req.limit)
			.query_arg_opt("product_code", req.product_code.as_ref())
			.query_arg_opt("brand_code", req.brand_code.as_ref())
			.query_arg_opt("card_holder_id", req.card_holder_id.as_ref())
			.query_arg_opt("create_start", req.create_start.as_ref())
			.query_arg_opt("create_end", req.create_end.as_ref())
			.query_arg_opt("status", req.status.as_ref());
		call(self.transport.as_ref(), request).await
	}

	pub async fn card_info(&self, card_id: &str) -> Result<CardInfo, ClientError> {
		let request = GSalaryRequest::get(format!("/v1/cards/{}", card_id));
		call(self.transport.as_ref(), request).await
	}

	pub async fn update_card(&self, req: &UpdateCardRequest) -> Result<CardInfo, ClientError> {
		let request = GSalaryRequest::put(format!("/v1/cards/{}", req.card_id)).json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	/// Delete a card. Deletion may complete asynchronously.
	pub async fn delete_card(&self, card_id: &str) -> Result<Outcome<Ack>, ClientError> {
		let request = GSalaryRequest::delete(format!("/v1/cards/{}", card_id));
		call_outcome(self.transport.as_ref(), request).await
	}

	pub async fn secure_info(&self, card_id: &str) -> Result<CardSecureInfo, ClientError> {
		let request = GSalaryRequest::get(format!("/v1/cards/{}/secure_info", card_id));
		call(self.transport.as_ref(), request).await
	}

	pub async fn adjust_balance(
		&self,
		req: &AdjustBalanceRequest,
	) -> Result<BalanceModifyResult, ClientError> {
		let request = GSalaryRequest::post("/v1/cards/balance_modifies").json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn balance_modify_result(
		&self,
		request_id: &str,
	) -> Result<BalanceModifyResult, ClientError> {
		let request = GSalaryRequest::get(format!("/v1/cards/balance_modifies/{}", request_id));
		call(self.transport.as_ref(), request).await
	}

	/// Freeze (`true`) or unfreeze (`false`) a card
	pub async fn set_freeze_status(
		&self,
		card_id: &str,
		freeze: bool,
	) -> Result<Outcome<Ack>, ClientError> {
		let request = GSalaryRequest::put(format!("/v1/cards/{}/freeze_status", card_id))
			.body_field("freeze", freeze);
		call_outcome(self.transport.as_ref(), request).await
	}

	pub async fn transactions(
		&self,
		req: &CardTransactionsRequest,
	) -> Result<CardTransactions, ClientError> {
		let request = GSalaryRequest::get("/v1/card_bill/card_transactions")
			.query_arg("page", req.page)
			.query_arg("limit", req.limit)
			.query_arg_opt("transaction_id", req.transaction_id.as_ref())
			.query_arg_opt("mch_request_id", req.mch_request_id.as_ref())
			.query_arg_opt("time_start", req.time_start.as_ref())
			.query_arg_opt("time_end", req.time_end.as_ref())
			.query_arg_opt("card_id", req.card_id.as_ref());
		call(self.transport.as_ref(), request).await
	}

	pub async fn balance_history(
		&self,
		req: &BalanceHistoryRequest,
	) -> Result<BalanceHistory, ClientError> {
		let request = GSalaryRequest::get("/v1/card_bill/balance_history")
			.query_arg("page", req.page)
			.query_arg("limit", req.limit)
			.query_arg_opt("transaction_id", req.transaction_id.as_ref())
			.query_arg_opt("log_id", req.log_id.as_ref())
			.query_arg_opt("time_start", req.time_start.as_ref())
			.query_arg_opt("time_end", req.time_end.as_ref())
			.query_arg_opt("card_id", req.card_id.as_ref());
		call(self.transport.as_ref(), request).await
	}

	/// Update the card contact email. `None` sends an empty update.
	pub async fn update_contact(
		&self,
		card_id: &str,
		email: Option<&str>,
	) -> Result<CardInfo, ClientError> {
		let mut request = GSalaryRequest::put(format!("/v1/cards/{}/contact", card_id));
		if let Some(email) = email {
			request = request.body_field("email", email);
		}
		call(self.transport.as_ref(), request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::testing::{RecordingTransport, success};
	use serde_json::json;

	#[tokio::test]
	async fn test_list_cards_query() {
		let transport = RecordingTransport::new(success(json!({
			"cards": [{"card_id": "c1", "status": "ACTIVE"}],
			"page": 1,
			"limit": 20,
			"total_count": 1,
			"total_page": 1,
		})));
		let api = CardApi::new(transport.clone());

		let list = api
			.list_cards(&CardListRequest {
				page: Some(1),
				limit: Some(20),
				status: Some("ACTIVE".to_string()),
				..Default::default()
			})
			.await
			.unwrap();
		assert_eq!(list.cards[0].card_id, "c1");
		assert_eq!(list.pagination.total_count, 1);

		let sent = transport.last();
		assert_eq!(sent.method, "GET");
		assert_eq!(sent.path_with_query(false), "/v1/cards?page=1&limit=20&status=ACTIVE");
	}

	#[tokio::test]
	async fn test_apply_card_omits_unset_limits() {
		let transport = RecordingTransport::new(success(json!({
			"request_id": "r1",
			"status": "PENDING",
		})));
		let api = CardApi::new(transport.clone());

		let receipt = api
			.apply_card(&CardApplyRequest {
				request_id: "r1".to_string(),
				product_code: "P1".to_string(),
				currency: "USD".to_string(),
				card_holder_id: "h1".to_string(),
				limit_per_day: Some(100.0),
				init_balance: 10.0,
				..Default::default()
			})
			.await
			.unwrap();
		assert_eq!(receipt.status, "PENDING");

		let sent = transport.last();
		assert_eq!(sent.path, "/v1/card_applies");
		assert_eq!(sent.body["limit_per_day"], json!(100.0));
		assert!(!sent.body.contains_key("limit_per_month"));
		assert!(!sent.body.contains_key("limit_per_transaction"));
	}

	#[tokio::test]
	async fn test_update_card_keeps_id_out_of_body() {
		let transport = RecordingTransport::new(success(json!({"card_id": "c1"})));
		let api = CardApi::new(transport.clone());

		api.update_card(&UpdateCardRequest {
			card_id: "c1".to_string(),
			card_name: Some("ops".to_string()),
			..Default::default()
		})
		.await
		.unwrap();

		let sent = transport.last();
		assert_eq!(sent.method, "PUT");
		assert_eq!(sent.path, "/v1/cards/c1");
		assert_eq!(Value::Object(sent.body), json!({"card_name": "ops"}));
	}

	#[tokio::test]
	async fn test_delete_card_pending() {
		let transport = RecordingTransport::new(json!({
			"result": {"result": "U", "code": "PROCESSING", "message": ""},
		}));
		let api = CardApi::new(transport.clone());

		let outcome = api.delete_card("c1").await.unwrap();
		assert!(outcome.is_pending());
		assert_eq!(transport.last().method, "DELETE");
	}

	#[tokio::test]
	async fn test_card_info_pending_is_error() {
		let transport = RecordingTransport::new(json!({
			"result": {"result": "U", "code": "PROCESSING", "message": ""},
		}));
		let api = CardApi::new(transport);

		let result = api.card_info("c1").await;
		assert!(matches!(result, Err(ClientError::Pending(_))));
	}

	#[tokio::test]
	async fn test_freeze_and_adjust_bodies() {
		let transport = RecordingTransport::new(success(json!({})));
		let api = CardApi::new(transport.clone());

		api.set_freeze_status("c1", true).await.unwrap();
		let sent = transport.last();
		assert_eq!(sent.path, "/v1/cards/c1/freeze_status");
		assert_eq!(Value::Object(sent.body), json!({"freeze": true}));

		api.adjust_balance(&AdjustBalanceRequest {
			card_id: "c1".to_string(),
			amount: 5.5,
			modify_type: BalanceModifyType::Increase,
			request_id: "r2".to_string(),
		})
		.await
		.unwrap();
		let sent = transport.last();
		assert_eq!(sent.body["type"], json!("INCREASE"));
	}

	#[test]
	fn test_secure_info_debug_is_redacted() {
		let info = CardSecureInfo {
			pan: "4111111111111111".to_string(),
			cvv: "123".to_string(),
			..Default::default()
		};
		assert!(!format!("{:?}", info).contains("4111"));
	}
}
