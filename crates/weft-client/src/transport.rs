// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The duplex transport owning one WebSocket connection.

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use weft_core::{GenerateRequest, SessionError, SessionResult};

use crate::config::SessionConfig;

/// One open duplex connection to the backend.
///
/// A session controller owns at most one of these at a time; replacing it
/// closes the predecessor first. The `epoch` tags every message the
/// connection yields so that frames from a replaced connection can be
/// fenced off by the controller.
pub struct TransportSession {
	epoch: u64,
	ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
	idle_timeout: std::time::Duration,
	sent: bool,
	closed: bool,
}

impl TransportSession {
	/// Open a connection to the configured endpoint.
	pub async fn open(epoch: u64, config: &SessionConfig) -> SessionResult<Self> {
		let (ws, _) = connect_async(config.endpoint.as_str())
			.await
			.map_err(|e| SessionError::Connectivity(format!("failed to connect: {e}")))?;
		debug!(endpoint = %config.endpoint, epoch, "connection opened");

		Ok(Self {
			epoch,
			ws,
			idle_timeout: config.idle_timeout,
			sent: false,
			closed: false,
		})
	}

	#[must_use]
	pub fn epoch(&self) -> u64 {
		self.epoch
	}

	/// Send the request payload. Exactly once per connection.
	pub async fn send(&mut self, payload: &GenerateRequest) -> SessionResult<()> {
		if self.sent {
			return Err(SessionError::InvalidState(
				"request already sent on this connection".to_string(),
			));
		}
		let json = serde_json::to_string(payload)
			.map_err(|e| SessionError::Input(format!("failed to encode request: {e}")))?;
		self.ws
			.send(Message::Text(json))
			.await
			.map_err(|e| SessionError::Connectivity(format!("failed to send request: {e}")))?;
		self.sent = true;
		Ok(())
	}

	/// The next inbound text frame, in delivery order.
	///
	/// Answers pings, skips non-text frames, and returns `Ok(None)` when
	/// the peer closes. Silence longer than the idle timeout is a
	/// connectivity error.
	pub async fn next_message(&mut self) -> SessionResult<Option<String>> {
		loop {
			let frame = tokio::time::timeout(self.idle_timeout, self.ws.next())
				.await
				.map_err(|_| {
					SessionError::Connectivity(format!(
						"no event from server within {:?}",
						self.idle_timeout
					))
				})?;

			match frame {
				Some(Ok(Message::Text(text))) => return Ok(Some(text)),
				Some(Ok(Message::Ping(data))) => {
					if let Err(e) = self.ws.send(Message::Pong(data)).await {
						return Err(SessionError::Connectivity(format!("connection failed: {e}")));
					}
				}
				Some(Ok(Message::Close(_))) | None => return Ok(None),
				Some(Ok(Message::Binary(data))) => {
					warn!(epoch = self.epoch, len = data.len(), "ignoring unexpected binary frame");
				}
				Some(Ok(_)) => {}
				Some(Err(e)) => {
					return Err(SessionError::Connectivity(format!("connection failed: {e}")));
				}
			}
		}
	}

	/// Close the connection. Idempotent; safe on an already-closed session.
	pub async fn close(&mut self) {
		if self.closed {
			return;
		}
		self.closed = true;
		if let Err(e) = self.ws.close(None).await {
			debug!(epoch = self.epoch, error = %e, "error while closing connection");
		}
	}
}

impl std::fmt::Debug for TransportSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TransportSession")
			.field("epoch", &self.epoch)
			.field("sent", &self.sent)
			.field("closed", &self.closed)
			.finish_non_exhaustive()
	}
}
