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

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use gsalary_sdk::WebhookVerifier;
use tracing::info;

use crate::config::WebhookServiceConfig;
use crate::handlers::WebhookState;
use crate::middleware::LoggingMiddleware;
use crate::routes::configure_routes;

/// Webhook receiver HTTP server
pub struct WebhookServer {
	config: WebhookServiceConfig,
	state: web::Data<WebhookState>,
}

impl WebhookServer {
	pub fn new(config: WebhookServiceConfig) -> Result<Self> {
		let sdk_config = config.gsalary_config()?;
		let mut verifier = WebhookVerifier::new(Arc::new(sdk_config));
		if let Some(window) = config.replay_window() {
			verifier = verifier.with_replay_window(window);
		}

		let state = web::Data::new(WebhookState {
			verifier,
			max_body_bytes: config.max_body_bytes,
		});
		Ok(Self { config, state })
	}

	/// Bind and run until shutdown
	pub async fn serve(self) -> Result<()> {
		let state = self.state.clone();
		let mut server = HttpServer::new(move || {
			App::new()
				.app_data(state.clone())
				.wrap(LoggingMiddleware)
				.configure(configure_routes)
		});
		if let Some(workers) = self.config.workers {
			server = server.workers(workers);
		}

		let addr = self.config.bind_addr;
		info!(
			target: "server",
			max_body_bytes = self.config.max_body_bytes,
			replay_window_secs = self.config.replay_window_secs,
			"Webhook receiver listening on {}",
			addr
		);

		server
			.bind(addr)
			.with_context(|| format!("Failed to bind {}", addr))?
			.run()
			.await
			.context("Webhook server terminated with an error")
	}
}
