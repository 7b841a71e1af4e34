// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error taxonomy for a transformation session.

use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur during a transformation session.
///
/// The first four variants are terminal for the current session: the
/// controller moves to the `Error` status and only `reset` recovers.
/// [`SessionError::InvalidState`] is caller misuse and leaves any running
/// session untouched.
#[derive(Clone, Error, Debug)]
pub enum SessionError {
	/// The request payload could not be built from the input image.
	#[error("input error: {0}")]
	Input(String),

	/// The transport failed to open, timed out, or closed before a
	/// terminal event.
	#[error("connection error: {0}")]
	Connectivity(String),

	/// A structurally malformed inbound message or a stage regression.
	#[error("protocol error: {0}")]
	Protocol(String),

	/// The server explicitly reported an error event.
	#[error("server error: {0}")]
	Remote(String),

	/// An operation was invoked in a state that does not permit it.
	#[error("invalid state: {0}")]
	InvalidState(String),
}

impl SessionError {
	/// Whether this error terminates the current session.
	#[must_use]
	pub fn is_terminal(&self) -> bool {
		!matches!(self, SessionError::InvalidState(_))
	}
}
