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

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::call;
use crate::client::{ClientError, Transport};
use crate::request::GSalaryRequest;

/// Wallet balance for one currency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletBalance {
	pub currency: String,
	pub amount: f64,
	pub share_card_account_balance: f64,
	pub available: f64,
	pub account_type: String,
	pub query_time: String,
}

/// Wallet endpoints
#[derive(Clone)]
pub struct WalletApi {
	transport: Arc<dyn Transport>,
}

impl WalletApi {
	pub fn new(transport: Arc<dyn Transport>) -> Self {
		Self { transport }
	}

	/// Balance in `currency`, or the platform default when `None`
	pub async fn balance(&self, currency: Option<&str>) -> Result<WalletBalance, ClientError> {
		let request = GSalaryRequest::get("/v1/wallets/balance").query_arg_opt("currency", currency);
		call(self.transport.as_ref(), request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::testing::{RecordingTransport, success};
	use serde_json::json;

	#[tokio::test]
	async fn test_balance() {
		let transport = RecordingTransport::new(success(json!({
			"currency": "USD",
			"amount": 1200.5,
			"available": 1000.0,
		})));
		let api = WalletApi::new(transport.clone());

		let balance = api.balance(Some("USD")).await.unwrap();
		assert_eq!(balance.currency, "USD");
		assert_eq!(balance.available, 1000.0);
		assert_eq!(
			transport.last().path_with_query(false),
			"/v1/wallets/balance?currency=USD"
		);
	}

	#[tokio::test]
	async fn test_balance_business_failure() {
		let transport = RecordingTransport::new(json!({
			"result": {"result": "F", "code": "INVALID_CURRENCY", "message": "bad currency"},
		}));
		let api = WalletApi::new(transport);

		match api.balance(Some("XXX")).await {
			Err(ClientError::Business(error)) => assert_eq!(error.sub_code, "INVALID_CURRENCY"),
			other => panic!("unexpected: {:?}", other),
		}
	}
}
