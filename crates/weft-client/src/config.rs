// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Client configuration.

use std::time::Duration;

use url::Url;
use weft_core::{SessionError, SessionResult};

/// Endpoint of the reference backend.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8000/ws/generate";

/// How long to wait for the next inbound event before failing the session.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for a session controller.
#[derive(Debug, Clone)]
pub struct SessionConfig {
	pub endpoint: Url,
	/// Maximum silence between inbound events before the session fails
	/// with a connectivity error.
	pub idle_timeout: Duration,
}

impl SessionConfig {
	/// Create a config pointing at `endpoint` (a `ws://` or `wss://` URL).
	pub fn new(endpoint: &str) -> SessionResult<Self> {
		let endpoint = Url::parse(endpoint)
			.map_err(|e| SessionError::Input(format!("invalid server URL: {e}")))?;
		match endpoint.scheme() {
			"ws" | "wss" => {}
			other => {
				return Err(SessionError::Input(format!(
					"unsupported URL scheme: {other}"
				)))
			}
		}
		Ok(Self {
			endpoint,
			idle_timeout: DEFAULT_IDLE_TIMEOUT,
		})
	}

	pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
		self.idle_timeout = idle_timeout;
		self
	}
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint parses"),
			idle_timeout: DEFAULT_IDLE_TIMEOUT,
		}
	}
}
