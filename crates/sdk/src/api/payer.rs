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

//! Remittance payers and their certificate attachments

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Ack, Address, Outcome, call, call_outcome};
use crate::client::{ClientError, Transport};
use crate::request::GSalaryRequest;

/// Attachment upload, content is base64 encoded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAttachmentRequest {
	/// e.g. `CERT_FILE`
	#[serde(rename = "type")]
	pub attachment_type: String,
	pub filename: String,
	pub base64: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
	pub file_id: String,
}

/// Payer details for add and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerRequest {
	/// `INDIVIDUAL` or `ENTERPRISE`
	pub subject_type: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	/// `PASSPORT`, `DRIVING_LICENSE`, `ID_CARD` or `BUSINESS_LICENSE`
	pub cert_type: String,
	pub cert_number: String,
	/// IDs returned by [`PayerApi::upload_attachment`]
	pub cert_files: Vec<String>,
	/// ISO-8601 date, individuals only
	#[serde(skip_serializing_if = "Option::is_none")]
	pub birthday: Option<String>,
	pub region: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub company_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub register_number: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub business_scopes: Vec<String>,
	pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payer {
	pub payer_id: String,
	pub subject_type: String,
	pub first_name: String,
	pub last_name: String,
	pub cert_type: String,
	pub cert_number: String,
	pub cert_files: Vec<String>,
	pub birthday: String,
	pub region: String,
	pub company_name: String,
	pub register_number: String,
	pub business_scopes: Vec<String>,
	pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayerList {
	pub payers: Vec<Payer>,
}

/// Payer endpoints
#[derive(Clone)]
pub struct PayerApi {
	transport: Arc<dyn Transport>,
}

impl PayerApi {
	pub fn new(transport: Arc<dyn Transport>) -> Self {
		Self { transport }
	}

	pub async fn upload_attachment(
		&self,
		req: &UploadAttachmentRequest,
	) -> Result<Attachment, ClientError> {
		let request = GSalaryRequest::post("/attachments").json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn add(&self, req: &PayerRequest) -> Result<Payer, ClientError> {
		let request = GSalaryRequest::post("/remittance/payers").json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn list(&self) -> Result<PayerList, ClientError> {
		call(
			self.transport.as_ref(),
			GSalaryRequest::get("/remittance/payers"),
		)
		.await
	}

	pub async fn get(&self, payer_id: &str) -> Result<Payer, ClientError> {
		let request = GSalaryRequest::get(format!("/remittance/payers/{}", payer_id));
		call(self.transport.as_ref(), request).await
	}

	pub async fn update(&self, payer_id: &str, req: &PayerRequest) -> Result<Payer, ClientError> {
		let request =
			GSalaryRequest::put(format!("/remittance/payers/{}", payer_id)).json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn delete(&self, payer_id: &str) -> Result<Outcome<Ack>, ClientError> {
		let request = GSalaryRequest::delete(format!("/remittance/payers/{}", payer_id));
		call_outcome(self.transport.as_ref(), request).await
	}
}
