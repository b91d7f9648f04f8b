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

//! Outbound request model
//!
//! A [`GSalaryRequest`] is plain data: method, path, ordered query arguments
//! and a JSON object body. Signing and dispatch live in [`crate::client`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::canonical::{CanonicalRequest, body_hash, query_escape};

/// Error types for request validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
	#[error("Invalid request: method and path are required")]
	MissingMethodOrPath,
	#[error("Invalid method: {0} (must be GET, POST, PUT or DELETE)")]
	UnsupportedMethod(String),
	#[error("Serialization error: {0}")]
	Serialization(String),
}

/// HTTP methods accepted by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
	Get,
	Post,
	Put,
	Delete,
}

impl Method {
	pub const fn as_str(&self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
		}
	}

	/// Only POST and PUT ever carry a body.
	pub const fn allows_body(&self) -> bool {
		matches!(self, Method::Post | Method::Put)
	}
}

impl FromStr for Method {
	type Err = RequestError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"GET" => Ok(Method::Get),
			"POST" => Ok(Method::Post),
			"PUT" => Ok(Method::Put),
			"DELETE" => Ok(Method::Delete),
			other => Err(RequestError::UnsupportedMethod(other.to_string())),
		}
	}
}

impl fmt::Display for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// One outbound API call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GSalaryRequest {
	/// HTTP method as given by the caller; checked by [`GSalaryRequest::validate`]
	pub method: String,
	/// Path without query string
	pub path: String,
	/// Query arguments in insertion order
	pub query: Vec<(String, String)>,
	/// JSON body, only sent for POST/PUT
	pub body: Map<String, Value>,
}

impl GSalaryRequest {
	pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
		Self {
			method: method.into(),
			path: path.into(),
			query: Vec::new(),
			body: Map::new(),
		}
	}

	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get.as_str(), path)
	}

	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post.as_str(), path)
	}

	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put.as_str(), path)
	}

	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete.as_str(), path)
	}

	/// Set a query argument. An existing key keeps its position.
	pub fn query_arg(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.set_query_arg(key, value);
		self
	}

	/// Set a query argument only when a value is present.
	pub fn query_arg_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
		if let Some(value) = value {
			self.set_query_arg(key, value);
		}
		self
	}

	pub fn set_query_arg(&mut self, key: impl Into<String>, value: impl ToString) {
		let key = key.into();
		let value = value.to_string();
		match self.query.iter_mut().find(|(k, _)| *k == key) {
			Some((_, existing)) => *existing = value,
			None => self.query.push((key, value)),
		}
	}

	/// Insert a single body field.
	pub fn body_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.body.insert(key.into(), value.into());
		self
	}

	/// Replace the body with the serialized fields of `payload`.
	///
	/// `payload` must serialize to a JSON object; `None` fields skipped by
	/// serde never reach the body.
	pub fn json_body<T: Serialize>(mut self, payload: &T) -> Result<Self, RequestError> {
		match serde_json::to_value(payload) {
			Ok(Value::Object(map)) => {
				self.body = map;
				Ok(self)
			}
			Ok(other) => Err(RequestError::Serialization(format!(
				"body must be a JSON object, got {}",
				other
			))),
			Err(e) => Err(RequestError::Serialization(e.to_string())),
		}
	}

	/// Check method and path, returning the parsed method.
	pub fn validate(&self) -> Result<Method, RequestError> {
		if self.method.is_empty() || self.path.is_empty() {
			return Err(RequestError::MissingMethodOrPath);
		}
		self.method.parse()
	}

	/// Whether a body is sent and hashed.
	pub fn has_body(&self) -> bool {
		self.method
			.parse::<Method>()
			.is_ok_and(|method| method.allows_body())
			&& !self.body.is_empty()
	}

	/// Path plus query string.
	///
	/// With `escape` the values are query-escaped for the wire; without it
	/// they are raw, which is the form that gets signed. Keys are never escaped.
	pub fn path_with_query(&self, escape: bool) -> String {
		if self.query.is_empty() {
			return self.path.clone();
		}

		let pairs: Vec<String> = self
			.query
			.iter()
			.map(|(key, value)| {
				if escape {
					format!("{}={}", key, query_escape(value))
				} else {
					format!("{}={}", key, value)
				}
			})
			.collect();

		format!("{}?{}", self.path, pairs.join("&"))
	}

	/// Serialize the body once. `None` when no body is sent.
	pub fn serialized_body(&self) -> Result<Option<Vec<u8>>, RequestError> {
		if !self.has_body() {
			return Ok(None);
		}
		serde_json::to_vec(&self.body)
			.map(Some)
			.map_err(|e| RequestError::Serialization(e.to_string()))
	}

	/// Canonical signing string for this request.
	///
	/// `body_hash` is the hash of whatever body is being signed: the outbound
	/// body when signing, the raw response body when verifying.
	pub fn sign_base(&self, app_id: &str, timestamp: &str, body_hash: &str) -> String {
		CanonicalRequest {
			method: &self.method,
			path_with_query: &self.path_with_query(false),
			app_id,
			timestamp,
			body_hash,
		}
		.sign_base()
	}

	/// `BODY_HASH` for a serialized body, empty when there is none.
	pub fn body_hash_of(body: Option<&[u8]>) -> String {
		body.map(body_hash).unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_validate() {
		assert_eq!(GSalaryRequest::get("/v1/cards").validate(), Ok(Method::Get));
		assert_eq!(
			GSalaryRequest::new("", "/v1/cards").validate(),
			Err(RequestError::MissingMethodOrPath)
		);
		assert_eq!(
			GSalaryRequest::new("GET", "").validate(),
			Err(RequestError::MissingMethodOrPath)
		);
		assert_eq!(
			GSalaryRequest::new("PATCH", "/v1/cards").validate(),
			Err(RequestError::UnsupportedMethod("PATCH".to_string()))
		);
		assert!(GSalaryRequest::new("get", "/v1/cards").validate().is_err());
	}

	#[test]
	fn test_has_body_only_for_post_and_put() {
		for method in ["POST", "PUT"] {
			let request = GSalaryRequest::new(method, "/x").body_field("a", 1);
			assert!(request.has_body());
			assert!(!GSalaryRequest::new(method, "/x").has_body());
		}
		for method in ["GET", "DELETE"] {
			let request = GSalaryRequest::new(method, "/x").body_field("a", 1);
			assert!(!request.has_body());
			assert_eq!(request.serialized_body().unwrap(), None);
			assert_eq!(GSalaryRequest::body_hash_of(None), "");
		}
	}

	#[test]
	fn test_serialized_body_hash() {
		let request = GSalaryRequest::post("/v1/cards").body_field("a", 1);
		let body = request.serialized_body().unwrap().unwrap();
		assert_eq!(body, br#"{"a":1}"#);
		assert_eq!(
			GSalaryRequest::body_hash_of(Some(body.as_slice())),
			"AVq9f1zFei3ZS3WQ8ErYCEJzkF7jPsXOvq5iJ2qX+GI="
		);
	}

	#[test]
	fn test_sign_base() {
		let request = GSalaryRequest::get("/v1/cards")
			.query_arg("page", 1)
			.query_arg("limit", 20);
		assert_eq!(
			request.sign_base("app1", "1700000000000", ""),
			"GET /v1/cards?page=1&limit=20\napp1\n1700000000000\n\n"
		);
	}

	#[test]
	fn test_body_keys_are_sorted() {
		let request = GSalaryRequest::post("/x")
			.body_field("b", 2)
			.body_field("a", json!({"z": 1, "y": 2}));
		let body = request.serialized_body().unwrap().unwrap();
		assert_eq!(body, br#"{"a":{"y":2,"z":1},"b":2}"#);
	}

	#[test]
	fn test_path_with_query_keeps_insertion_order() {
		let request = GSalaryRequest::get("/v1/cards")
			.query_arg("page", 1)
			.query_arg("limit", 20);
		assert_eq!(request.path_with_query(false), "/v1/cards?page=1&limit=20");
		assert_eq!(request.path_with_query(true), "/v1/cards?page=1&limit=20");
	}

	#[test]
	fn test_query_arg_replaces_in_place() {
		let request = GSalaryRequest::get("/x")
			.query_arg("a", "1")
			.query_arg("b", "2")
			.query_arg("a", "3");
		assert_eq!(request.path_with_query(false), "/x?a=3&b=2");
	}

	#[test]
	fn test_path_with_query_escaping() {
		let request = GSalaryRequest::get("/x")
			.query_arg("q", "a b&c")
			.query_arg_opt("skip", None::<String>)
			.query_arg_opt("time", Some("2024-01-01T00:00:00+08:00"));
		assert_eq!(
			request.path_with_query(false),
			"/x?q=a b&c&time=2024-01-01T00:00:00+08:00"
		);
		assert_eq!(
			request.path_with_query(true),
			"/x?q=a+b%26c&time=2024-01-01T00%3A00%3A00%2B08%3A00"
		);
		assert_eq!(GSalaryRequest::get("/x").path_with_query(true), "/x");
	}

	#[test]
	fn test_json_body_skips_none_fields() {
		#[derive(Serialize)]
		struct Payload {
			name: String,
			#[serde(skip_serializing_if = "Option::is_none")]
			note: Option<String>,
		}

		let request = GSalaryRequest::post("/x")
			.json_body(&Payload {
				name: "n".to_string(),
				note: None,
			})
			.unwrap();
		assert_eq!(request.body.len(), 1);
		assert!(GSalaryRequest::post("/x").json_body(&1).is_err());
	}
}
