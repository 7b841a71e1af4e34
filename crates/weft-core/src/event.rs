// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Inbound wire events and their decoder.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{SessionError, SessionResult};

/// One inbound message from the backend, decoded from a text frame.
///
/// `Unknown` is an explicit variant rather than a decode failure: new
/// non-critical event kinds must not break older clients, so an
/// unrecognized `type` tag is surfaced for logging and then ignored.
/// Structurally malformed messages are rejected instead, see
/// [`ServerEvent::decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
	/// Pipeline progress. `step` is the raw wire key; the backend emits
	/// auxiliary steps outside the fixed stage list, so interpretation is
	/// left to the session controller.
	Status { step: String, message: String },
	/// One incremental fragment of generated code.
	Chunk { chunk: String },
	/// The artifact is complete; no further events follow.
	Complete,
	/// The server failed; `message` is human-readable.
	Error { message: String },
	/// An event kind this client does not know about.
	Unknown { kind: String },
}

/// Typed view of the known wire tags. Kept private so that unknown tags
/// can be split off before strict field validation kicks in.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum WireEvent {
	#[serde(rename = "status")]
	Status {
		step: String,
		#[serde(default)]
		message: String,
	},
	#[serde(rename = "code_chunk")]
	Chunk { chunk: String },
	#[serde(rename = "complete")]
	Complete,
	#[serde(rename = "error")]
	Error { message: String },
}

const KNOWN_TAGS: [&str; 4] = ["status", "code_chunk", "complete", "error"];

impl ServerEvent {
	/// Decode one raw text frame.
	///
	/// Messages that are not JSON objects, carry no `type` tag, or are
	/// missing a required field for a known tag are protocol errors.
	/// A well-formed object with an unrecognized tag decodes to
	/// [`ServerEvent::Unknown`].
	pub fn decode(raw: &str) -> SessionResult<Self> {
		let value: Value = serde_json::from_str(raw)
			.map_err(|e| SessionError::Protocol(format!("inbound message is not valid JSON: {e}")))?;

		let Some(object) = value.as_object() else {
			return Err(SessionError::Protocol(
				"inbound message is not a JSON object".to_string(),
			));
		};

		let Some(tag) = object.get("type").and_then(Value::as_str).map(str::to_owned) else {
			return Err(SessionError::Protocol(
				"inbound message is missing a type tag".to_string(),
			));
		};

		if !KNOWN_TAGS.contains(&tag.as_str()) {
			return Ok(ServerEvent::Unknown { kind: tag });
		}

		let event = serde_json::from_value::<WireEvent>(value)
			.map_err(|e| SessionError::Protocol(format!("malformed {tag} event: {e}")))?;

		Ok(match event {
			WireEvent::Status { step, message } => ServerEvent::Status { step, message },
			WireEvent::Chunk { chunk } => ServerEvent::Chunk { chunk },
			WireEvent::Complete => ServerEvent::Complete,
			WireEvent::Error { message } => ServerEvent::Error { message },
		})
	}
}
