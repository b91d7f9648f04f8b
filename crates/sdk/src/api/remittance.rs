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

//! Cross-border remittance: clearing networks, quotes and orders
//!
//! A remittance runs payee account, then quote, then order. Order results are
//! also pushed as `REMITTANCE_ORDER_RESULT` webhooks.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CurrencyAmount, Pagination, call};
use crate::client::{ClientError, Transport};
use crate::request::GSalaryRequest;

/// Which side of the transfer `amount` fixes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmountType {
	#[default]
	PayAmount,
	ReceiveAmount,
}

impl AmountType {
	pub const fn as_str(&self) -> &'static str {
		match self {
			AmountType::PayAmount => "PAY_AMOUNT",
			AmountType::ReceiveAmount => "RECEIVE_AMOUNT",
		}
	}
}

impl fmt::Display for AmountType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClearingNetworksRequest {
	pub payee_account_id: String,
	pub pay_currency: String,
	pub amount: f64,
	pub amount_type: AmountType,
	pub receive_currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearingNetwork {
	/// e.g. `SWIFT`, `ACH`, `FPS`
	pub network: String,
	pub fee: f64,
	pub estimated_arrival_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearingNetworks {
	pub clearing_networks: Vec<ClearingNetwork>,
	pub payee_account_id: String,
	pub pay_currency: String,
	pub receive_currency: String,
	pub amount: f64,
	pub amount_type: Option<AmountType>,
	pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemittanceQuoteRequest {
	pub payee_account_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub payer_id: Option<String>,
	pub purpose: String,
	pub pay_currency: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub receive_currency: Option<String>,
	pub amount: f64,
	pub amount_type: AmountType,
	/// Required when the payee account requires a clearing network
	#[serde(skip_serializing_if = "Option::is_none")]
	pub clearing_network: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub aba_number: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub fps_bank_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ifs_code: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub intermediary_swift_code: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub remark: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemittanceQuote {
	pub quote_id: String,
	pub payment_method: String,
	pub pay_amount: CurrencyAmount,
	pub receive_amount: CurrencyAmount,
	pub surcharge: CurrencyAmount,
	pub exchange_rate: f64,
	pub expire_at: String,
}

/// Remittance order, also delivered as a `REMITTANCE_ORDER_RESULT` webhook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemittanceOrder {
	pub order_id: String,
	/// `API` or `PORTAL`
	pub order_source: String,
	pub client_order_id: String,
	pub create_time: String,
	pub finish_time: String,
	pub status: String,
	pub payee_id: String,
	pub payee_account_id: String,
	pub payment_method: String,
	pub pay_amount: CurrencyAmount,
	pub receive_amount: CurrencyAmount,
	pub surcharge: CurrencyAmount,
	pub exchange_rate: f64,
	pub error_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemittanceOrdersRequest {
	pub page: u32,
	pub limit: u32,
	pub payee_id: Option<String>,
	pub payer_id: Option<String>,
	/// Inclusive
	pub time_start: Option<String>,
	/// Exclusive
	pub time_end: Option<String>,
	pub order_id: Option<String>,
	pub client_order_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemittanceOrders {
	pub query: Option<Value>,
	pub orders: Vec<RemittanceOrder>,
	#[serde(flatten)]
	pub pagination: Pagination,
}

/// Remittance endpoints
#[derive(Clone)]
pub struct RemittanceApi {
	transport: Arc<dyn Transport>,
}

impl RemittanceApi {
	pub fn new(transport: Arc<dyn Transport>) -> Self {
		Self { transport }
	}

	pub async fn clearing_networks(
		&self,
		req: &ClearingNetworksRequest,
	) -> Result<ClearingNetworks, ClientError> {
		let request = GSalaryRequest::get("/remittance/clearing_networks")
			.query_arg("payee_account_id", &req.payee_account_id)
			.query_arg("pay_currency", &req.pay_currency)
			.query_arg("amount", format!("{:.6}", req.amount))
			.query_arg("amount_type", req.amount_type)
			.query_arg("receive_currency", &req.receive_currency);
		call(self.transport.as_ref(), request).await
	}

	/// Lock an exchange rate for a transfer
	pub async fn create_quote(
		&self,
		req: &RemittanceQuoteRequest,
	) -> Result<RemittanceQuote, ClientError> {
		let request = GSalaryRequest::post("/remittance/quotes").json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	/// Submit an order against a quote. `client_order_id` must be unique.
	pub async fn submit_order(
		&self,
		quote_id: &str,
		client_order_id: &str,
	) -> Result<RemittanceOrder, ClientError> {
		let request = GSalaryRequest::post("/remittance/orders")
			.body_field("quote_id", quote_id)
			.body_field("client_order_id", client_order_id);
		call(self.transport.as_ref(), request).await
	}

	pub async fn orders(
		&self,
		req: &RemittanceOrdersRequest,
	) -> Result<RemittanceOrders, ClientError> {
		let request = GSalaryRequest::get("/remittance/orders")
			.query_arg("page", req.page)
			.query_arg("limit", req.limit)
			.query_arg_opt("payee_id", req.payee_id.as_ref())
			.query_arg_opt("payer_id", req.payer_id.as_ref())
			.query_arg_opt("time_start", req.time_start.as_ref())
			.query_arg_opt("time_end", req.time_end.as_ref())
			.query_arg_opt("order_id", req.order_id.as_ref())
			.query_arg_opt("client_order_id", req.client_order_id.as_ref());
		call(self.transport.as_ref(), request).await
	}
}
