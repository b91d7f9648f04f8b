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

//! Logging initialization for the webhook receiver
//!
//! Environment variables:
//!
//! - `RUST_LOG`: filter directives (default: `info`), e.g.
//!   `RUST_LOG=gsalary_webhook=debug,gsalary_sdk=debug`
//! - `LOG_DIR`: root directory for log files (default: `./logs`). Files go
//!   to `{LOG_DIR}/webhook/webhook.{date}.log`, one per day (UTC).
//! - `LOG_TO_CONSOLE`: `true`, `1` or `yes` also writes to stderr with colors.

use std::{
	env,
	path::{Path, PathBuf},
	sync::OnceLock,
};

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::{
	non_blocking,
	rolling::{self, Rotation},
};
use tracing_subscriber::{
	EnvFilter, fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt,
};

use crate::config::{DEFAULT_LOG_LEVEL, DEFAULT_LOG_TO_CONSOLE, LOG_COMPONENT_NAME};

static LOG_GUARD: OnceLock<non_blocking::WorkerGuard> = OnceLock::new();

fn log_root() -> PathBuf {
	env::var("LOG_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|_| PathBuf::from("logs"))
}

fn log_to_console() -> bool {
	env::var("LOG_TO_CONSOLE")
		.map(|v| parse_flag(&v))
		.unwrap_or(DEFAULT_LOG_TO_CONSOLE)
}

fn parse_flag(value: &str) -> bool {
	matches!(value, "true" | "1" | "yes")
}

fn setup_file_logging(log_dir: &Path) -> Result<non_blocking::NonBlocking> {
	let file_appender = rolling::RollingFileAppender::builder()
		.rotation(Rotation::DAILY)
		.filename_prefix(LOG_COMPONENT_NAME.to_string())
		.filename_suffix("log")
		.build(log_dir)
		.with_context(|| {
			format!(
				"Failed to create rolling file appender in {}",
				log_dir.display()
			)
		})?;

	let (file_writer, guard) = non_blocking(file_appender);
	// Dropping the guard loses buffered lines.
	LOG_GUARD.set(guard).ok();

	Ok(file_writer)
}

/// Initialize file logging and, when enabled, console logging
pub fn init_logging() -> Result<()> {
	dotenv::dotenv().ok();

	let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
	let log_dir = log_root().join(LOG_COMPONENT_NAME);
	std::fs::create_dir_all(&log_dir)
		.with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

	let file_writer = setup_file_logging(&log_dir)?;
	let console = log_to_console();
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

	let file_layer = fmt::layer()
		.with_writer(file_writer)
		.with_timer(fmt::time::UtcTime::rfc_3339())
		.with_thread_ids(true)
		.with_target(true)
		.with_ansi(false);
	let console_layer = console.then(|| {
		fmt::layer()
			.with_writer(std::io::stderr)
			.with_timer(fmt::time::UtcTime::rfc_3339())
			.with_thread_ids(true)
			.with_target(true)
			.with_ansi(true)
	});

	Registry::default()
		.with(filter)
		.with(file_layer)
		.with(console_layer)
		.try_init()
		.context("Failed to install tracing subscriber")?;

	info!(target: "server", "Log level: {}", log_level);
	info!(target: "server", "Log directory: {}", log_dir.display());
	if console {
		info!(target: "server", "Console output: enabled");
	}

	Ok(())
}
