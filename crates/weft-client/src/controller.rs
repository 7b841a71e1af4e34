// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The session controller: one transformation session, end to end.

use tokio::sync::watch;
use tracing::{debug, warn};
use weft_core::{Framework, GenerateRequest, ServerEvent, SessionError, SessionResult, Stage};

use crate::config::SessionConfig;
use crate::state::{SessionState, SessionStatus};
use crate::transport::TransportSession;

/// Owns exactly one transformation session at a time.
///
/// `start` encodes the input and opens the connection, `run` folds the
/// inbound event stream into the session state until a terminal status,
/// and `reset` is the only way out of `Complete` or `Error`. Observers
/// subscribe to state snapshots through [`SessionController::subscribe`];
/// a snapshot is published after every atomic transition.
pub struct SessionController {
	config: SessionConfig,
	state: SessionState,
	transport: Option<TransportSession>,
	/// Incremented on every start and reset. Events tagged with an older
	/// epoch come from a replaced connection and are dropped unseen.
	epoch: u64,
	watch_tx: watch::Sender<SessionState>,
}

impl SessionController {
	#[must_use]
	pub fn new(config: SessionConfig) -> Self {
		let (watch_tx, _) = watch::channel(SessionState::new());
		Self {
			config,
			state: SessionState::new(),
			transport: None,
			epoch: 0,
			watch_tx,
		}
	}

	/// Read-only view of the current session state.
	#[must_use]
	pub fn state(&self) -> &SessionState {
		&self.state
	}

	/// The current session epoch; events tagged otherwise are stale.
	#[must_use]
	pub fn epoch(&self) -> u64 {
		self.epoch
	}

	/// Subscribe to state snapshots, one per atomic transition.
	#[must_use]
	pub fn subscribe(&self) -> watch::Receiver<SessionState> {
		self.watch_tx.subscribe()
	}

	/// Begin a new session for `image`.
	///
	/// Rejected while a session is processing. Starting from a terminal
	/// status implicitly discards the previous session and its
	/// connection. A payload failure moves straight to `Error` without
	/// opening a connection.
	pub async fn start(&mut self, image: &[u8], framework: Framework) -> SessionResult<()> {
		if self.state.status == SessionStatus::Processing {
			return Err(SessionError::InvalidState(
				"a session is already processing; reset it first".to_string(),
			));
		}

		self.close_transport().await;
		self.epoch += 1;
		self.state = SessionState::new();
		self.state.framework = Some(framework);

		let payload = match GenerateRequest::from_image_bytes(image, framework) {
			Ok(payload) => payload,
			Err(e) => {
				self.fail(&e);
				return Err(e);
			}
		};

		let mut transport = match TransportSession::open(self.epoch, &self.config).await {
			Ok(transport) => transport,
			Err(e) => {
				self.fail(&e);
				return Err(e);
			}
		};

		if let Err(e) = transport.send(&payload).await {
			transport.close().await;
			self.fail(&e);
			return Err(e);
		}

		self.transport = Some(transport);
		self.state.status = SessionStatus::Processing;
		self.state.current_stage = Some(Stage::first());
		self.notify();
		debug!(epoch = self.epoch, framework = %framework, "session started");
		Ok(())
	}

	/// Drive the session to a terminal status, processing each inbound
	/// event to completion before the next.
	pub async fn run(&mut self) -> SessionResult<SessionStatus> {
		if self.state.status != SessionStatus::Processing {
			return Err(SessionError::InvalidState(
				"no session is processing".to_string(),
			));
		}

		while !self.state.status.is_terminal() {
			let Some(transport) = self.transport.as_mut() else {
				return Err(SessionError::InvalidState("no open connection".to_string()));
			};
			let epoch = transport.epoch();

			match transport.next_message().await {
				Ok(Some(raw)) => match ServerEvent::decode(&raw) {
					Ok(event) => self.apply_event(epoch, event),
					Err(e) => self.fail(&e),
				},
				Ok(None) => {
					self.fail(&SessionError::Connectivity(
						"connection closed before completion".to_string(),
					));
				}
				Err(e) => self.fail(&e),
			}
		}

		self.close_transport().await;
		Ok(self.state.status)
	}

	/// Return to `Idle`: close any open connection and clear all session
	/// state. Always legal, idempotent.
	pub async fn reset(&mut self) {
		self.close_transport().await;
		self.epoch += 1;
		self.state = SessionState::new();
		self.notify();
		debug!(epoch = self.epoch, "session reset");
	}

	/// Apply one decoded event to the session.
	///
	/// This is the single mutation path for inbound events. `epoch` must
	/// match the controller's current epoch; events from a replaced
	/// connection are dropped without touching state, as are events
	/// arriving once the session has left `Processing`.
	pub fn apply_event(&mut self, epoch: u64, event: ServerEvent) {
		if epoch != self.epoch {
			debug!(
				stale_epoch = epoch,
				current_epoch = self.epoch,
				"dropping event from a replaced connection"
			);
			return;
		}
		if self.state.status != SessionStatus::Processing {
			debug!(status = %self.state.status, "dropping event outside an active session");
			return;
		}

		match event {
			ServerEvent::Status { step, message } => self.apply_status(&step, message),
			ServerEvent::Chunk { chunk } => {
				self.state.artifact.append(&chunk);
				self.notify();
			}
			ServerEvent::Complete => {
				self.state.status = SessionStatus::Complete;
				self.notify();
			}
			ServerEvent::Error { message } => {
				self.state.status = SessionStatus::Error;
				self.state.log.push(format!("Error: {message}"));
				self.notify();
			}
			ServerEvent::Unknown { kind } => {
				warn!(kind = %kind, "ignoring unknown event kind");
			}
		}
	}

	/// Handle a `status` event. Tracked stage keys advance the stage;
	/// auxiliary keys only contribute their log line.
	fn apply_status(&mut self, step: &str, message: String) {
		if let Ok(stage) = step.parse::<Stage>() {
			if let Some(current) = self.state.current_stage {
				if stage.position() < current.position() {
					self.fail(&SessionError::Protocol(format!(
						"stage regressed from {current} to {stage}"
					)));
					return;
				}
			}
			self.state.current_stage = Some(stage);
		} else {
			debug!(step, "status step is not a tracked stage");
		}

		if !message.is_empty() {
			self.state.log.push(message);
		}
		self.notify();
	}

	/// Terminal failure: record the error and move to `Error`. Artifact
	/// content accumulated so far is preserved.
	fn fail(&mut self, error: &SessionError) {
		warn!(error = %error, "session failed");
		self.state.status = SessionStatus::Error;
		self.state.log.push(error.to_string());
		self.notify();
	}

	fn notify(&self) {
		self.watch_tx.send_replace(self.state.clone());
	}

	async fn close_transport(&mut self) {
		if let Some(mut transport) = self.transport.take() {
			transport.close().await;
		}
	}
}
