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

mod config;
mod handlers;
mod logging;
mod middleware;
mod routes;
mod server;

use anyhow::{Context, Result};
use tracing::info;

use crate::{config::WebhookServiceConfig, logging::init_logging};
use server::WebhookServer;

#[actix_rt::main]
async fn main() -> Result<()> {
	// Initialize logging first
	init_logging()?;

	let config = match std::env::var("GSALARY_WEBHOOK_CONFIG") {
		Ok(path) => WebhookServiceConfig::from_file(&path)
			.with_context(|| format!("Failed to load config file {}", path))?,
		Err(_) => WebhookServiceConfig::from_env()?,
	};
	info!(target: "server", "Starting GSalary webhook receiver on {}", config.bind_addr);

	let server = WebhookServer::new(config).context("Failed to create webhook server")?;
	server.serve().await
}
