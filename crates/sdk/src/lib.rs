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

//! GSalary SDK - Client library for the GSalary open API
//!
//! This crate signs outbound API calls, verifies signed responses and
//! webhooks, and exposes typed wrappers for cards, card holders, wallets,
//! exchange, acquiring payments, payees, payers and remittance.
//!
//! The SDK is designed to be lightweight and embeddable:
//! - No background threads
//! - No global state; configuration is passed in as an `Arc<GSalaryConfig>`
//! - No environment or configuration loading

pub mod api;
pub mod canonical;
pub mod client;
pub mod config;
pub mod header;
pub mod request;
pub mod signing;
pub mod webhook;

pub use api::{ApiResponse, BizResult, GSalaryApi, Outcome, ResultStatus};
pub use client::{
	BusinessError, Client, ClientError, HttpExchange, HttpRequest, HttpResponse, ReqwestExchange,
	SyncClient, Transport,
};
pub use config::{ConfigError, Credentials, GSalaryConfig};
pub use header::AuthorizationHeader;
pub use request::{GSalaryRequest, Method, RequestError};
pub use signing::{SignatureAlgorithm, SigningError, sign_message, verify_message};
pub use webhook::{WebhookError, WebhookEvent, WebhookResponse, WebhookVerifier};
