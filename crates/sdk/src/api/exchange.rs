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

//! Currency exchange: rates, quotes and orders

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CurrencyAmount, Pagination, call};
use crate::client::{ClientError, Transport};
use crate::request::GSalaryRequest;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeRate {
	pub buy_currency: String,
	pub sell_currency: String,
	pub rate: f64,
	pub update_time: String,
}

/// Fixed side of a quote. Exactly one side is fixed per quote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuoteAmount {
	/// Sell this much of the sell currency
	Sell(f64),
	/// Buy this much of the buy currency
	Buy(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeQuoteRequest {
	pub buy_currency: String,
	pub sell_currency: String,
	pub amount: QuoteAmount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeQuote {
	pub quote_id: String,
	pub buy: CurrencyAmount,
	pub sell: CurrencyAmount,
	pub surcharge: CurrencyAmount,
	pub total_cost: CurrencyAmount,
	pub update_time: String,
	pub expire_time: String,
}

/// Exchange order, also delivered as an `EXCHANGE_ORDER_RESULT` webhook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeOrder {
	pub order_id: String,
	pub request_id: String,
	pub create_time: String,
	pub status: String,
	pub source: String,
	pub sell: CurrencyAmount,
	pub buy: CurrencyAmount,
	pub surcharge: CurrencyAmount,
	pub exchange_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeOrdersRequest {
	pub page: Option<u32>,
	pub limit: Option<u32>,
	pub time_start: Option<String>,
	pub time_end: Option<String>,
	pub status: Option<String>,
	pub buy_currency: Option<String>,
	pub sell_currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeOrders {
	pub query: Option<Value>,
	pub orders: Vec<ExchangeOrder>,
	#[serde(flatten)]
	pub pagination: Pagination,
}

/// Exchange endpoints
#[derive(Clone)]
pub struct ExchangeApi {
	transport: Arc<dyn Transport>,
}

impl ExchangeApi {
	pub fn new(transport: Arc<dyn Transport>) -> Self {
		Self { transport }
	}

	pub async fn current_rate(
		&self,
		buy_currency: &str,
		sell_currency: &str,
	) -> Result<ExchangeRate, ClientError> {
		let request = GSalaryRequest::get("/v1/exchange/current_exchange_rate")
			.query_arg("buy_currency", buy_currency)
			.query_arg("sell_currency", sell_currency);
		call(self.transport.as_ref(), request).await
	}

	pub async fn request_quote(
		&self,
		req: &ExchangeQuoteRequest,
	) -> Result<ExchangeQuote, ClientError> {
		let request = GSalaryRequest::post("/v1/exchange/quotes")
			.body_field("buy_currency", req.buy_currency.as_str())
			.body_field("sell_currency", req.sell_currency.as_str());
		let request = match req.amount {
			QuoteAmount::Sell(amount) => request.body_field("sell_amount", amount),
			QuoteAmount::Buy(amount) => request.body_field("buy_amount", amount),
		};
		call(self.transport.as_ref(), request).await
	}

	/// Execute a quote obtained from [`ExchangeApi::request_quote`]
	pub async fn submit(&self, request_id: &str, quote_id: &str) -> Result<ExchangeOrder, ClientError> {
		let request = GSalaryRequest::post("/v1/exchange/submit_request")
			.body_field("request_id", request_id)
			.body_field("quote_id", quote_id);
		call(self.transport.as_ref(), request).await
	}

	pub async fn orders(&self, req: &ExchangeOrdersRequest) -> Result<ExchangeOrders, ClientError> {
		let request = GSalaryRequest::get("/v1/exchange/orders")
			.query_arg_opt("page", req.page)
			.query_arg_opt("limit", req.limit)
			.query_arg_opt("time_start", req.time_start.as_ref())
			.query_arg_opt("time_end", req.time_end.as_ref())
			.query_arg_opt("status", req.status.as_ref())
			.query_arg_opt("buy_currency", req.buy_currency.as_ref())
			.query_arg_opt("sell_currency", req.sell_currency.as_ref());
		call(self.transport.as_ref(), request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::testing::{RecordingTransport, success};
	use serde_json::json;

	#[tokio::test]
	async fn test_quote_sends_one_side() {
		let transport = RecordingTransport::new(success(json!({
			"quote_id": "q1",
			"buy": {"currency": "USD", "amount": 100.0},
			"sell": {"currency": "CNY", "amount": 720.0},
		})));
		let api = ExchangeApi::new(transport.clone());

		let quote = api
			.request_quote(&ExchangeQuoteRequest {
				buy_currency: "USD".to_string(),
				sell_currency: "CNY".to_string(),
				amount: QuoteAmount::Buy(100.0),
			})
			.await
			.unwrap();
		assert_eq!(quote.quote_id, "q1");
		assert_eq!(quote.sell.amount, 720.0);

		let sent = transport.last();
		assert_eq!(sent.body["buy_amount"], json!(100.0));
		assert!(!sent.body.contains_key("sell_amount"));
	}

	#[tokio::test]
	async fn test_current_rate_query_order() {
		let transport = RecordingTransport::new(success(json!({"rate": 7.2})));
		let api = ExchangeApi::new(transport.clone());

		let rate = api.current_rate("USD", "CNY").await.unwrap();
		assert_eq!(rate.rate, 7.2);
		assert_eq!(
			transport.last().path_with_query(false),
			"/v1/exchange/current_exchange_rate?buy_currency=USD&sell_currency=CNY"
		);
	}

	#[tokio::test]
	async fn test_submit_body() {
		let transport = RecordingTransport::new(success(json!({
			"order_id": "o1",
			"status": "PROCESSING",
		})));
		let api = ExchangeApi::new(transport.clone());

		let order = api.submit("r1", "q1").await.unwrap();
		assert_eq!(order.order_id, "o1");
		assert_eq!(
			Value::Object(transport.last().body),
			json!({"request_id": "r1", "quote_id": "q1"})
		);
	}
}
