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

//! Canonical signing string construction
//!
//! Every signed exchange with the platform hashes the same layout:
//!
//! ```text
//! METHOD SP PATH_WITH_QUERY \n
//! APP_ID \n
//! TIMESTAMP \n
//! BODY_HASH \n
//! ```
//!
//! - `PATH_WITH_QUERY` carries raw (unescaped) query values. The path sent over
//!   the wire is escaped; the signed one is not.
//! - `BODY_HASH` is `base64(sha256(body))`, or empty when nothing is hashed.
//!
//! Outbound requests, API responses and the request side of any verifier all
//! go through [`CanonicalRequest::sign_base`], so both ends agree byte for byte.

use std::borrow::Cow;

use base64::{Engine, engine::general_purpose::STANDARD};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use sha2::{Digest, Sha256};

/// Characters escaped in query values and header parameters
///
/// Only unreserved characters (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`) pass through.
const QUERY_ESCAPE_SET: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'~');

/// Inputs of one canonical signing string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalRequest<'a> {
	/// Upper-case HTTP method
	pub method: &'a str,
	/// Path followed by the unescaped query string, if any
	pub path_with_query: &'a str,
	/// Merchant application ID
	pub app_id: &'a str,
	/// Milliseconds since epoch, decimal
	pub timestamp: &'a str,
	/// `base64(sha256(body))` or empty
	pub body_hash: &'a str,
}

impl CanonicalRequest<'_> {
	/// Render the exact string that gets hashed and signed.
	#[must_use]
	pub fn sign_base(&self) -> String {
		format!(
			"{} {}\n{}\n{}\n{}\n",
			self.method, self.path_with_query, self.app_id, self.timestamp, self.body_hash
		)
	}
}

/// Hash a serialized body for the `BODY_HASH` segment.
///
/// Always hash the bytes that are actually sent or received, never a
/// re-serialization of them.
#[must_use]
pub fn body_hash(body: &[u8]) -> String {
	STANDARD.encode(Sha256::digest(body))
}

/// Percent-escape every byte outside the unreserved set.
#[must_use]
pub fn percent_escape(value: &str) -> String {
	utf8_percent_encode(value, QUERY_ESCAPE_SET).to_string()
}

/// Escape a value for use in a query string.
///
/// Same as [`percent_escape`] except that spaces become `+`.
#[must_use]
pub fn query_escape(value: &str) -> String {
	// '%' is itself escaped, so "%20" in the output can only come from a space.
	percent_escape(value).replace("%20", "+")
}

/// Reverse [`percent_escape`].
///
/// Returns `None` for a dangling or non-hex `%` escape, or when the decoded
/// bytes are not UTF-8. A literal `+` is kept as-is because it is part of the
/// base64 alphabet carried in signature headers.
#[must_use]
pub fn query_unescape(value: &str) -> Option<String> {
	let bytes = value.as_bytes();
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'%' {
			let well_formed = bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
				&& bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
			if !well_formed {
				return None;
			}
			i += 3;
		} else {
			i += 1;
		}
	}

	percent_decode_str(value)
		.decode_utf8()
		.ok()
		.map(Cow::into_owned)
}
