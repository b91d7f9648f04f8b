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

use std::future::{Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::{
	Error,
	dev::{Service, ServiceRequest, ServiceResponse, Transform},
	http::header::{HeaderName, HeaderValue},
};
use tracing::{Instrument, info};
use uuid::Uuid;

/// HTTP header name for request ID
pub const HEADER_REQUEST_ID: &str = "X-Request-Id";

/// Logging middleware for actix-web
///
/// Runs each request inside an `http_request` span tagged with a request ID,
/// taken from `X-Request-Id` or generated, and echoes the ID on the response.
pub struct LoggingMiddleware;

impl<S, B> Transform<S, ServiceRequest> for LoggingMiddleware
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
	S::Future: 'static,
	B: 'static,
{
	type Response = ServiceResponse<B>;
	type Error = Error;
	type InitError = ();
	type Transform = LoggingMiddlewareInner<S>;
	type Future = Ready<Result<Self::Transform, Self::InitError>>;

	fn new_transform(&self, service: S) -> Self::Future {
		ready(Ok(LoggingMiddlewareInner {
			service: Rc::new(service),
		}))
	}
}

pub struct LoggingMiddlewareInner<S> {
	service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggingMiddlewareInner<S>
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
	S::Future: 'static,
	B: 'static,
{
	type Response = ServiceResponse<B>;
	type Error = Error;
	type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

	fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.service.poll_ready(cx)
	}

	fn call(&self, req: ServiceRequest) -> Self::Future {
		let service = self.service.clone();
		let request_id = req
			.headers()
			.get(HEADER_REQUEST_ID)
			.and_then(|value| value.to_str().ok())
			.filter(|value| !value.is_empty())
			.map(str::to_string)
			.unwrap_or_else(|| Uuid::new_v4().to_string());
		let span = tracing::info_span!(
			"http_request",
			method = %req.method(),
			path = %req.path(),
			request_id = %request_id,
		);

		Box::pin(
			async move {
				let start = std::time::Instant::now();
				let res = service.call(req).await;
				let duration = start.elapsed();

				match res {
					Ok(mut response) => {
						info!(
							status = response.status().as_u16(),
							duration_ms = duration.as_millis(),
							"Request completed"
						);
						if let Ok(value) = HeaderValue::from_str(&request_id) {
							response
								.headers_mut()
								.insert(HeaderName::from_static("x-request-id"), value);
						}
						Ok(response)
					}
					Err(e) => {
						tracing::error!(error = %e, duration_ms = duration.as_millis(), "Request failed");
						Err(e)
					}
				}
			}
			.instrument(span),
		)
	}
}
