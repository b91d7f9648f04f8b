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

//! Authorization header codec
//!
//! Wire format (request `Authorization` header, echoed on responses and sent
//! with webhooks):
//!
//! ```text
//! algorithm=RSA2,time=<ms since epoch>,signature=<percent-encoded base64>
//! ```
//!
//! Parsing never fails. Anything that is not exactly three comma-separated
//! segments decodes to the empty header, which is never valid.

use std::fmt;

use crate::canonical::{percent_escape, query_unescape};

/// HTTP header carrying the signature
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Parsed or freshly built signature header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationHeader {
	/// Algorithm name, `RSA2` for this protocol version
	pub algorithm: String,
	/// Milliseconds since epoch, decimal
	pub timestamp: String,
	/// Base64 signature (already percent-decoded)
	pub signature: String,
}

impl AuthorizationHeader {
	pub fn new(
		algorithm: impl Into<String>,
		timestamp: impl Into<String>,
		signature: impl Into<String>,
	) -> Self {
		Self {
			algorithm: algorithm.into(),
			timestamp: timestamp.into(),
			signature: signature.into(),
		}
	}

	/// A header is usable only when all three fields are present.
	pub fn is_valid(&self) -> bool {
		!self.algorithm.is_empty() && !self.timestamp.is_empty() && !self.signature.is_empty()
	}

	/// Encode for the wire.
	pub fn to_header_value(&self) -> String {
		format!(
			"algorithm={},time={},signature={}",
			self.algorithm,
			self.timestamp,
			percent_escape(&self.signature)
		)
	}

	/// Decode a header value.
	pub fn parse(value: &str) -> Self {
		let parts: Vec<&str> = value.split(',').collect();
		if parts.len() != 3 {
			return Self::default();
		}

		let mut header = Self::default();
		for part in parts {
			let Some((key, value)) = part.split_once('=') else {
				continue;
			};
			match key {
				"algorithm" => header.algorithm = value.to_string(),
				"time" => header.timestamp = value.to_string(),
				"signature" => {
					header.signature = query_unescape(value).unwrap_or_else(|| value.to_string())
				}
				_ => {}
			}
		}

		header
	}
}

impl fmt::Display for AuthorizationHeader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_header_value())
	}
}

impl From<&str> for AuthorizationHeader {
	fn from(value: &str) -> Self {
		Self::parse(value)
	}
}
