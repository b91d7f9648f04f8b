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

use actix_web::{HttpRequest, HttpResponse, Responder, http::StatusCode, web};
use gsalary_sdk::webhook::{TypedEvent, WebhookError, WebhookEvent, WebhookResponse, WebhookVerifier};
use thiserror::Error;
use tracing::{info, warn};

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "authorization";

/// Shared handler state
pub struct WebhookState {
	pub verifier: WebhookVerifier,
	pub max_body_bytes: usize,
}

/// Rejected delivery
///
/// The platform expects HTTP 200 with a `result: "F"` body, so the error
/// response keeps status 200.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct WebhookRejection(#[from] WebhookError);

impl actix_web::ResponseError for WebhookRejection {
	fn status_code(&self) -> StatusCode {
		StatusCode::OK
	}

	fn error_response(&self) -> HttpResponse {
		HttpResponse::build(self.status_code()).json(WebhookResponse::from(&self.0))
	}
}

/// Health check endpoint
pub async fn health() -> impl Responder {
	HttpResponse::Ok().json(serde_json::json!({
		"status": "ok",
		"service": "gsalary-webhook"
	}))
}

/// Receive one webhook delivery
///
/// The body is read raw so the signature is checked over the exact bytes
/// the platform sent.
pub async fn receive(
	state: web::Data<WebhookState>,
	req: HttpRequest,
	payload: web::Payload,
) -> Result<HttpResponse, WebhookRejection> {
	let body = match payload.to_bytes_limited(state.max_body_bytes).await {
		Ok(Ok(body)) => body,
		Ok(Err(e)) => return Err(WebhookError::ReadBody(e.to_string()).into()),
		Err(_) => {
			warn!(limit = state.max_body_bytes, "Webhook body too large");
			return Err(WebhookError::ReadBody(format!(
				"body exceeds {} bytes",
				state.max_body_bytes
			))
			.into());
		}
	};

	let authorization = req
		.headers()
		.get(SIGNATURE_HEADER)
		.and_then(|value| value.to_str().ok());
	let event = state.verifier.verify(authorization, &body)?;

	info!(
		app_id = %event.app_id,
		business_type = %event.business_type,
		timestamp = event.timestamp,
		"Webhook accepted"
	);
	log_event(&event);

	Ok(HttpResponse::Ok().json(WebhookResponse::success()))
}

/// Any method other than POST on the webhook path
pub async fn method_not_allowed() -> impl Responder {
	HttpResponse::MethodNotAllowed().json(WebhookResponse::method_not_allowed())
}

fn log_event(event: &WebhookEvent) {
	match event.typed() {
		Ok(TypedEvent::PaymentResult(data)) => info!(
			payment_id = %data.payment_id,
			payment_request_id = %data.payment_request_id,
			status = %data.payment_status,
			"Payment result"
		),
		Ok(TypedEvent::AuthToken(data)) => info!(
			auth_state = %data.auth_state,
			status = %data.status,
			"Auth token update"
		),
		Ok(TypedEvent::CardStatusUpdate(data)) => info!(
			card_id = %data.card_id,
			status = %data.status,
			"Card status update"
		),
		Ok(TypedEvent::CardTransaction(data)) => info!(
			card_id = %data.card_id,
			transaction_id = %data.transaction_id,
			amount = data.amount,
			currency = %data.currency,
			"Card transaction"
		),
		Ok(TypedEvent::CardAdjustResult(data)) => info!(
			card_id = %data.card_id,
			request_id = %data.request_id,
			status = %data.status,
			"Card balance adjustment"
		),
		Ok(TypedEvent::ExchangeOrderResult(data)) => info!(
			order_id = %data.order_id,
			status = %data.status,
			"Exchange order result"
		),
		Ok(TypedEvent::RemittanceOrderResult(data)) => info!(
			order_id = %data.order_id,
			client_order_id = %data.client_order_id,
			status = %data.status,
			"Remittance order result"
		),
		Ok(TypedEvent::Other { business_type, .. }) => {
			info!(business_type = %business_type, "Untyped webhook event")
		}
		// The envelope verified, so the delivery is still acknowledged.
		Err(e) => warn!(error = %e, "Failed to decode webhook payload"),
	}
}
