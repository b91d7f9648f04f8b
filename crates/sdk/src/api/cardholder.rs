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

//! Card holders

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Address, MobileNumber, Pagination, call};
use crate::client::{ClientError, Transport};
use crate::request::GSalaryRequest;

/// Card holder profile, used both to create and to update a holder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardHolderRequest {
	pub first_name: String,
	pub last_name: String,
	/// `YYYY-MM-DD`
	pub birth: String,
	pub email: String,
	pub mobile: MobileNumber,
	pub region: String,
	pub bill_address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardHolder {
	pub card_holder_id: String,
	pub first_name: String,
	pub last_name: String,
	pub birth: String,
	pub email: String,
	pub mobile: MobileNumber,
	pub region: String,
	pub bill_address: Address,
	pub created_at: String,
	pub updated_at: String,
}

/// Holder details as returned by the info endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardHolderDetail {
	pub card_holder_id: String,
	pub first_name: String,
	pub last_name: String,
	pub birth: String,
	pub email: String,
	pub region: String,
	pub create_time: String,
	pub bill_address: Option<Value>,
	pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardHolderListRequest {
	pub page: Option<u32>,
	pub limit: Option<u32>,
	pub time_start: Option<String>,
	pub time_end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardHolderList {
	pub query: Option<Value>,
	pub card_holders: Vec<CardHolder>,
	#[serde(flatten)]
	pub pagination: Pagination,
}

/// Card holder endpoints
#[derive(Clone)]
pub struct CardHolderApi {
	transport: Arc<dyn Transport>,
}

impl CardHolderApi {
	pub fn new(transport: Arc<dyn Transport>) -> Self {
		Self { transport }
	}

	pub async fn add(&self, req: &CardHolderRequest) -> Result<CardHolder, ClientError> {
		let request = GSalaryRequest::post("/v1/card_holders").json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn list(&self, req: &CardHolderListRequest) -> Result<CardHolderList, ClientError> {
		let request = GSalaryRequest::get("/v1/card_holders")
			.query_arg_opt("page", req.page)
			.query_arg_opt("limit", req.limit)
			.query_arg_opt("time_start", req.time_start.as_ref())
			.query_arg_opt("time_end", req.time_end.as_ref());
		call(self.transport.as_ref(), request).await
	}

	pub async fn info(&self, card_holder_id: &str) -> Result<CardHolderDetail, ClientError> {
		let request = GSalaryRequest::get(format!("/v1/card_holders/{}", card_holder_id));
		call(self.transport.as_ref(), request).await
	}

	pub async fn update(
		&self,
		card_holder_id: &str,
		req: &CardHolderRequest,
	) -> Result<CardHolder, ClientError> {
		let request =
			GSalaryRequest::put(format!("/v1/card_holders/{}", card_holder_id)).json_body(req)?;
		call(self.transport.as_ref(), request).await
	}
}
