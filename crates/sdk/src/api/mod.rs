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

//! Typed resource APIs
//!
//! Every business response shares one envelope:
//!
//! ```json
//! {"result": {"result": "S", "code": "...", "message": "..."}, "data": {...}}
//! ```
//!
//! Wrappers build a [`GSalaryRequest`], run it through a [`Transport`] and
//! decode the envelope structurally. Most endpoints treat anything but `S` as
//! an error; the few that may legitimately answer `U` return an [`Outcome`].

pub mod card;
pub mod cardholder;
pub mod exchange;
pub mod payee;
pub mod payer;
pub mod payment;
pub mod remittance;
pub mod wallet;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::client::{BusinessError, Client, ClientError, Transport};
use crate::request::GSalaryRequest;

pub use card::CardApi;
pub use cardholder::CardHolderApi;
pub use exchange::ExchangeApi;
pub use payee::PayeeApi;
pub use payer::PayerApi;
pub use payment::PaymentApi;
pub use remittance::RemittanceApi;
pub use wallet::WalletApi;

/// Business result of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultStatus {
	#[serde(rename = "S")]
	Success,
	#[serde(rename = "F")]
	Failure,
	/// Accepted, outcome not known yet
	#[serde(rename = "U")]
	Pending,
}

impl ResultStatus {
	pub const fn as_str(&self) -> &'static str {
		match self {
			ResultStatus::Success => "S",
			ResultStatus::Failure => "F",
			ResultStatus::Pending => "U",
		}
	}
}

/// `result` member of the envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BizResult {
	pub result: ResultStatus,
	#[serde(default)]
	pub code: String,
	#[serde(default)]
	pub message: String,
}

impl From<BizResult> for BusinessError {
	fn from(result: BizResult) -> Self {
		BusinessError {
			code: result.result.as_str().to_string(),
			sub_code: result.code,
			message: result.message,
		}
	}
}

/// Response envelope
///
/// `data` stays raw until the result is known to be `S`, so a failed or
/// pending call never trips over a payload that does not fit `T`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound = "")]
pub struct ApiResponse<T> {
	pub result: BizResult,
	#[serde(default)]
	pub data: Option<Value>,
	#[serde(skip)]
	marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> ApiResponse<T> {
	/// Convert a verified response object without re-serializing it.
	pub fn from_map(map: Map<String, Value>) -> Result<Self, ClientError> {
		serde_json::from_value(Value::Object(map))
			.map_err(|e| ClientError::Decode(format!("Failed to decode response: {}", e)))
	}

	/// Data of a successful call. Only `S` counts as success.
	pub fn into_data(self) -> Result<T, ClientError> {
		match self.into_outcome()? {
			Outcome::Success(data) => Ok(data),
			Outcome::Pending(result) => Err(ClientError::Pending(result.into())),
		}
	}

	/// Success or pending. Only `F` is an error.
	pub fn into_outcome(self) -> Result<Outcome<T>, ClientError> {
		match self.result.result {
			ResultStatus::Success => {
				let data = match self.data {
					Some(data) => serde_json::from_value(data).map_err(|e| {
						ClientError::Decode(format!("Failed to decode response data: {}", e))
					})?,
					// `Ack` and other unit-like results may omit `data`.
					None => serde_json::from_value(Value::Null).map_err(|_| {
						ClientError::Decode("Response is missing data".to_string())
					})?,
				};
				Ok(Outcome::Success(data))
			}
			ResultStatus::Pending => Ok(Outcome::Pending(self.result)),
			ResultStatus::Failure => Err(ClientError::Business(self.result.into())),
		}
	}
}

/// Result of an endpoint that may still be processing
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
	Success(T),
	Pending(BizResult),
}

impl<T> Outcome<T> {
	pub fn is_pending(&self) -> bool {
		matches!(self, Outcome::Pending(_))
	}

	pub fn success(self) -> Option<T> {
		match self {
			Outcome::Success(data) => Some(data),
			Outcome::Pending(_) => None,
		}
	}
}

/// Data of endpoints that answer without a payload
///
/// Accepts whatever `data` holds, including nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ack;

impl<'de> Deserialize<'de> for Ack {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		IgnoredAny::deserialize(deserializer).map(|_| Ack)
	}
}

/// Pagination block shared by list responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
	#[serde(default)]
	pub page: u32,
	#[serde(default)]
	pub limit: u32,
	#[serde(default)]
	pub total_count: u64,
	#[serde(default)]
	pub total_page: u32,
}

/// Mobile number with country calling code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileNumber {
	pub country_code: String,
	pub number: String,
}

/// Postal address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
	#[serde(default)]
	pub country: String,
	#[serde(default)]
	pub state: String,
	#[serde(default)]
	pub city: String,
	#[serde(default)]
	pub postal_code: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub line1: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub line2: String,
}

/// Currency and amount pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyAmount {
	pub currency: String,
	#[serde(default)]
	pub amount: f64,
}

pub(crate) async fn call<T: DeserializeOwned>(
	transport: &dyn Transport,
	request: GSalaryRequest,
) -> Result<T, ClientError> {
	let map = transport.request(request).await?;
	ApiResponse::<T>::from_map(map)?.into_data()
}

pub(crate) async fn call_outcome<T: DeserializeOwned>(
	transport: &dyn Transport,
	request: GSalaryRequest,
) -> Result<Outcome<T>, ClientError> {
	let map = transport.request(request).await?;
	ApiResponse::<T>::from_map(map)?.into_outcome()
}

/// One wrapper per resource group over a shared transport
#[derive(Clone)]
pub struct GSalaryApi {
	pub cards: CardApi,
	pub card_holders: CardHolderApi,
	pub wallets: WalletApi,
	pub exchange: ExchangeApi,
	pub payments: PaymentApi,
	pub payees: PayeeApi,
	pub payers: PayerApi,
	pub remittance: RemittanceApi,
}

impl GSalaryApi {
	pub fn new(transport: Arc<dyn Transport>) -> Self {
		Self {
			cards: CardApi::new(transport.clone()),
			card_holders: CardHolderApi::new(transport.clone()),
			wallets: WalletApi::new(transport.clone()),
			exchange: ExchangeApi::new(transport.clone()),
			payments: PaymentApi::new(transport.clone()),
			payees: PayeeApi::new(transport.clone()),
			payers: PayerApi::new(transport.clone()),
			remittance: RemittanceApi::new(transport),
		}
	}

	pub fn from_client(client: Client) -> Self {
		Self::new(Arc::new(client))
	}
}
