// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Observable session state and the stage-progress query.

use serde::{Deserialize, Serialize};
use weft_core::{Artifact, Framework, Stage};

/// Lifecycle status of a session.
///
/// `Complete` and `Error` are terminal; only `reset` leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
	Idle,
	Processing,
	Complete,
	Error,
}

impl SessionStatus {
	/// Whether no further events may mutate artifact or stage.
	#[must_use]
	pub fn is_terminal(self) -> bool {
		matches!(self, SessionStatus::Complete | SessionStatus::Error)
	}
}

impl Default for SessionStatus {
	fn default() -> Self {
		SessionStatus::Idle
	}
}

impl std::fmt::Display for SessionStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			SessionStatus::Idle => write!(f, "idle"),
			SessionStatus::Processing => write!(f, "processing"),
			SessionStatus::Complete => write!(f, "complete"),
			SessionStatus::Error => write!(f, "error"),
		}
	}
}

/// Progress of one pipeline stage relative to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageProgress {
	Past,
	Active,
	Upcoming,
}

/// Read-only snapshot of one session.
///
/// Mutation happens only inside the controller's event-processing path;
/// collaborators receive clones of this through the watch channel.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
	pub status: SessionStatus,
	/// The stage named by the most recent tracked status event.
	pub current_stage: Option<Stage>,
	/// Human-readable status lines, append-only.
	pub log: Vec<String>,
	/// The accumulating output artifact.
	pub artifact: Artifact,
	/// Immutable once a session starts; `None` while idle.
	pub framework: Option<Framework>,
}

impl SessionState {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Classify `stage` as past, active, or upcoming.
	///
	/// A stage is past when its position precedes the current stage's, or
	/// when the session is complete (then every stage is past). It is
	/// active only while the session is still processing.
	#[must_use]
	pub fn stage_progress(&self, stage: Stage) -> StageProgress {
		if self.status == SessionStatus::Complete {
			return StageProgress::Past;
		}
		match self.current_stage {
			Some(current) if stage == current && self.status == SessionStatus::Processing => {
				StageProgress::Active
			}
			Some(current) if stage.position() < current.position() => StageProgress::Past,
			_ => StageProgress::Upcoming,
		}
	}

	/// The user-facing artifact, fence-stripped.
	#[must_use]
	pub fn final_artifact(&self) -> String {
		self.artifact.final_artifact()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_idle_defaults() {
		let state = SessionState::new();
		assert_eq!(state.status, SessionStatus::Idle);
		assert_eq!(state.current_stage, None);
		assert!(state.log.is_empty());
		assert!(state.artifact.is_empty());
		assert_eq!(state.framework, None);
	}

	#[test]
	fn test_stage_progress_while_processing() {
		let state = SessionState {
			status: SessionStatus::Processing,
			current_stage: Some(Stage::Layout),
			..SessionState::new()
		};
		assert_eq!(state.stage_progress(Stage::Preprocessing), StageProgress::Past);
		assert_eq!(state.stage_progress(Stage::Ocr), StageProgress::Past);
		assert_eq!(state.stage_progress(Stage::Layout), StageProgress::Active);
		assert_eq!(state.stage_progress(Stage::Generation), StageProgress::Upcoming);
	}

	#[test]
	fn test_all_stages_past_on_complete() {
		let state = SessionState {
			status: SessionStatus::Complete,
			current_stage: Some(Stage::Generation),
			..SessionState::new()
		};
		for stage in weft_core::STAGES {
			assert_eq!(state.stage_progress(stage), StageProgress::Past);
		}
	}

	#[test]
	fn test_no_stage_active_after_error() {
		let state = SessionState {
			status: SessionStatus::Error,
			current_stage: Some(Stage::Detection),
			..SessionState::new()
		};
		assert_eq!(state.stage_progress(Stage::Detection), StageProgress::Upcoming);
		assert_eq!(state.stage_progress(Stage::Preprocessing), StageProgress::Past);
	}

	#[test]
	fn test_no_stage_progress_while_idle() {
		let state = SessionState::new();
		for stage in weft_core::STAGES {
			assert_eq!(state.stage_progress(stage), StageProgress::Upcoming);
		}
	}
}
