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

//! Remittance payees and their receiving accounts

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Ack, MobileNumber, Outcome, Pagination, call, call_outcome};
use crate::client::{ClientError, Transport};
use crate::request::GSalaryRequest;

/// Payee details for add and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeeRequest {
	/// `INDIVIDUAL` or `ENTERPRISE`
	pub subject_type: String,
	/// `E_WALLET` or `BANK_ACCOUNT`
	pub account_type: String,
	pub country: String,
	/// Required for individuals
	#[serde(skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	/// Required for enterprises
	#[serde(skip_serializing_if = "Option::is_none")]
	pub account_holder: Option<String>,
	pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payee {
	pub payee_id: String,
	pub subject_type: String,
	pub account_type: String,
	pub first_name: String,
	pub last_name: String,
	pub country: String,
	pub currencies: Vec<String>,
	pub account_holder: String,
	pub mobile: Option<MobileNumber>,
	pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeeListRequest {
	pub page: u32,
	pub limit: u32,
	pub payee_id: Option<String>,
	/// Person or company name
	pub name: Option<String>,
	pub country: Option<String>,
	pub currency: Option<String>,
	/// Phone number without calling code
	pub mobile: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayeeList {
	pub query: Option<Value>,
	pub payees: Vec<Payee>,
	#[serde(flatten)]
	pub pagination: Pagination,
}

/// Name and value of one account form field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
	pub field_name: String,
	#[serde(default)]
	pub field_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayeeAccount {
	pub payment_method: String,
	pub currencies: Vec<String>,
	pub account_id: String,
	pub account_no: String,
	/// `PENDING`, `ACTIVE` or `INACTIVE`
	pub status: String,
	pub require_clearing_network: bool,
	pub form_fields: Vec<FormField>,
}

/// E-wallet account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeeAccountRequest {
	/// e.g. `ALIPAY`
	pub payment_method: String,
	pub account_no: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayeeAccounts {
	pub accounts: Vec<PayeeAccount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFormRequest {
	/// e.g. `BANK_TRANSFER`
	pub payment_method: String,
	pub currency: Option<String>,
	/// Form language, server default `en`
	pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountFormField {
	pub field_name: String,
	pub required: bool,
	pub description: String,
}

/// Fields a bank account registration must supply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountForm {
	pub account_type: String,
	pub payment_method: String,
	pub subject_type: String,
	pub currency: String,
	pub country: String,
	pub fields: Vec<AccountFormField>,
}

/// Bank account registration, filled from an [`AccountForm`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccountRequest {
	pub payment_method: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub currency: Option<String>,
	pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentMethods {
	pub payment_methods: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutCountry {
	pub country: String,
	pub currencies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutCurrencies {
	pub payment_method: String,
	pub countries: Vec<PayoutCountry>,
}

/// Payee endpoints
#[derive(Clone)]
pub struct PayeeApi {
	transport: Arc<dyn Transport>,
}

impl PayeeApi {
	pub fn new(transport: Arc<dyn Transport>) -> Self {
		Self { transport }
	}

	pub async fn add(&self, req: &PayeeRequest) -> Result<Payee, ClientError> {
		let request = GSalaryRequest::post("/remittance/payees").json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn list(&self, req: &PayeeListRequest) -> Result<PayeeList, ClientError> {
		let request = GSalaryRequest::get("/remittance/payees")
			.query_arg("page", req.page)
			.query_arg("limit", req.limit)
			.query_arg_opt("payee_id", req.payee_id.as_ref())
			.query_arg_opt("name", req.name.as_ref())
			.query_arg_opt("country", req.country.as_ref())
			.query_arg_opt("currency", req.currency.as_ref())
			.query_arg_opt("mobile", req.mobile.as_ref());
		call(self.transport.as_ref(), request).await
	}

	pub async fn update(&self, payee_id: &str, req: &PayeeRequest) -> Result<Payee, ClientError> {
		let request =
			GSalaryRequest::put(format!("/remittance/payees/{}", payee_id)).json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn delete(&self, payee_id: &str) -> Result<Outcome<Ack>, ClientError> {
		let request = GSalaryRequest::delete(format!("/remittance/payees/{}", payee_id));
		call_outcome(self.transport.as_ref(), request).await
	}

	/// Add an e-wallet account
	pub async fn add_account(
		&self,
		payee_id: &str,
		req: &PayeeAccountRequest,
	) -> Result<PayeeAccount, ClientError> {
		let request = GSalaryRequest::post(format!("/remittance/payees/{}/accounts", payee_id))
			.json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn accounts(
		&self,
		payee_id: &str,
		language: Option<&str>,
	) -> Result<PayeeAccounts, ClientError> {
		let request = GSalaryRequest::get(format!("/remittance/payees/{}/accounts", payee_id))
			.query_arg_opt("language", language);
		call(self.transport.as_ref(), request).await
	}

	pub async fn update_account(
		&self,
		payee_id: &str,
		account_id: &str,
		req: &PayeeAccountRequest,
	) -> Result<PayeeAccount, ClientError> {
		let request = GSalaryRequest::put(format!(
			"/remittance/payees/{}/payee_accounts/{}",
			payee_id, account_id
		))
		.json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	/// Registration form for a bank account
	pub async fn account_form(
		&self,
		payee_id: &str,
		req: &AccountFormRequest,
	) -> Result<AccountForm, ClientError> {
		let request = GSalaryRequest::get(format!(
			"/remittance/payees/{}/account_register_format",
			payee_id
		))
		.query_arg("payment_method", &req.payment_method)
		.query_arg_opt("currency", req.currency.as_ref())
		.query_arg_opt("language", req.language.as_ref());
		call(self.transport.as_ref(), request).await
	}

	/// Register a bank account
	pub async fn register_account(
		&self,
		payee_id: &str,
		req: &BankAccountRequest,
	) -> Result<PayeeAccount, ClientError> {
		let request =
			GSalaryRequest::post(format!("/remittance/payees/{}/account_registry", payee_id))
				.json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn update_registered_account(
		&self,
		account_id: &str,
		req: &BankAccountRequest,
	) -> Result<PayeeAccount, ClientError> {
		let request = GSalaryRequest::put(format!("/remittance/payee_accounts/{}", account_id))
			.json_body(req)?;
		call(self.transport.as_ref(), request).await
	}

	pub async fn delete_account(&self, account_id: &str) -> Result<Outcome<Ack>, ClientError> {
		let request = GSalaryRequest::delete(format!("/remittance/payee_accounts/{}", account_id));
		call_outcome(self.transport.as_ref(), request).await
	}

	pub async fn payment_methods(&self) -> Result<PaymentMethods, ClientError> {
		let request = GSalaryRequest::get("/remittance/available_payment_methods");
		call(self.transport.as_ref(), request).await
	}

	pub async fn payout_currencies(
		&self,
		payment_method: &str,
	) -> Result<PayoutCurrencies, ClientError> {
		let request = GSalaryRequest::get("/remittance/payout_currencies")
			.query_arg("payment_method", payment_method);
		call(self.transport.as_ref(), request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::testing::{RecordingTransport, success};
	use serde_json::json;

	#[tokio::test]
	async fn test_add_individual_payee() {
		let transport = RecordingTransport::new(success(json!({
			"payee_id": "pe1",
			"subject_type": "INDIVIDUAL",
			"currencies": ["CNY"],
			"mobile": {"country_code": "86", "number": "13800000000"},
		})));
		let api = PayeeApi::new(transport.clone());

		let payee = api
			.add(&PayeeRequest {
				subject_type: "INDIVIDUAL".to_string(),
				account_type: "E_WALLET".to_string(),
				country: "CN".to_string(),
				first_name: Some("San".to_string()),
				last_name: Some("Zhang".to_string()),
				account_holder: None,
				currency: "CNY".to_string(),
			})
			.await
			.unwrap();
		assert_eq!(payee.payee_id, "pe1");
		assert_eq!(payee.mobile.unwrap().number, "13800000000");

		let sent = transport.last();
		assert_eq!(sent.method, "POST");
		assert!(!sent.body.contains_key("account_holder"));
		assert_eq!(sent.body["first_name"], json!("San"));
	}

	#[tokio::test]
	async fn test_list_required_paging_first() {
		let transport = RecordingTransport::new(success(json!({
			"payees": [{"payee_id": "pe1"}],
			"page": 1,
			"limit": 10,
			"total_count": 1,
			"total_page": 1,
		})));
		let api = PayeeApi::new(transport.clone());

		let list = api
			.list(&PayeeListRequest {
				page: 1,
				limit: 10,
				country: Some("CN".to_string()),
				..Default::default()
			})
			.await
			.unwrap();
		assert_eq!(list.payees.len(), 1);
		assert_eq!(list.pagination.total_count, 1);
		assert_eq!(
			transport.last().path_with_query(false),
			"/remittance/payees?page=1&limit=10&country=CN"
		);
	}

	#[tokio::test]
	async fn test_register_bank_account() {
		let transport = RecordingTransport::new(success(json!({
			"account_id": "acc1",
			"status": "PENDING",
			"require_clearing_network": true,
		})));
		let api = PayeeApi::new(transport.clone());

		let account = api
			.register_account(
				"pe1",
				&BankAccountRequest {
					payment_method: "BANK_TRANSFER".to_string(),
					currency: None,
					fields: vec![FormField {
						field_name: "swift_code".to_string(),
						field_value: "BKCHCNBJ".to_string(),
					}],
				},
			)
			.await
			.unwrap();
		assert!(account.require_clearing_network);

		let sent = transport.last();
		assert_eq!(sent.path, "/remittance/payees/pe1/account_registry");
		assert_eq!(
			Value::Object(sent.body),
			json!({
				"payment_method": "BANK_TRANSFER",
				"fields": [{"field_name": "swift_code", "field_value": "BKCHCNBJ"}],
			})
		);
	}

	#[tokio::test]
	async fn test_account_form_query() {
		let transport = RecordingTransport::new(success(json!({
			"payment_method": "BANK_TRANSFER",
			"fields": [{"field_name": "account_no", "required": true}],
		})));
		let api = PayeeApi::new(transport.clone());

		let form = api
			.account_form(
				"pe1",
				&AccountFormRequest {
					payment_method: "BANK_TRANSFER".to_string(),
					currency: None,
					language: Some("zh".to_string()),
				},
			)
			.await
			.unwrap();
		assert!(form.fields[0].required);
		assert_eq!(
			transport.last().path_with_query(false),
			"/remittance/payees/pe1/account_register_format?payment_method=BANK_TRANSFER&language=zh"
		);
	}

	#[tokio::test]
	async fn test_delete_account_uses_delete() {
		let transport = RecordingTransport::new(json!({
			"result": {"result": "S", "code": "SUCCESS", "message": ""},
			"data": null,
		}));
		let api = PayeeApi::new(transport.clone());

		assert_eq!(
			api.delete_account("acc1").await.unwrap(),
			Outcome::Success(Ack)
		);
		let sent = transport.last();
		assert_eq!(sent.method, "DELETE");
		assert_eq!(sent.path, "/remittance/payee_accounts/acc1");
	}
}
