// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The fixed, ordered backend pipeline stages.

use serde::{Deserialize, Serialize};

/// One named phase of the backend pipeline.
///
/// The list is fixed and the declaration order is significant: it defines
/// the past/active/upcoming relation used for progress reporting. Wire keys
/// are the lowercase identifiers the backend emits in `status` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
	Preprocessing,
	Detection,
	/// Text extraction.
	Ocr,
	Layout,
	Generation,
}

/// All stages in pipeline order.
pub const STAGES: [Stage; 5] = [
	Stage::Preprocessing,
	Stage::Detection,
	Stage::Ocr,
	Stage::Layout,
	Stage::Generation,
];

impl Stage {
	/// The first stage of the pipeline.
	#[must_use]
	pub fn first() -> Self {
		STAGES[0]
	}

	/// Zero-based position in the fixed pipeline order.
	#[must_use]
	pub fn position(self) -> usize {
		STAGES.iter().position(|s| *s == self).unwrap_or(0)
	}

	/// Human-readable label for progress display.
	#[must_use]
	pub fn label(self) -> &'static str {
		match self {
			Stage::Preprocessing => "Preprocessing",
			Stage::Detection => "Detecting UI elements",
			Stage::Ocr => "Extracting text",
			Stage::Layout => "Analyzing layout",
			Stage::Generation => "Generating code",
		}
	}
}

impl std::fmt::Display for Stage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Stage::Preprocessing => write!(f, "preprocessing"),
			Stage::Detection => write!(f, "detection"),
			Stage::Ocr => write!(f, "ocr"),
			Stage::Layout => write!(f, "layout"),
			Stage::Generation => write!(f, "generation"),
		}
	}
}

impl std::str::FromStr for Stage {
	type Err = crate::error::SessionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"preprocessing" => Ok(Stage::Preprocessing),
			"detection" => Ok(Stage::Detection),
			"ocr" => Ok(Stage::Ocr),
			"layout" => Ok(Stage::Layout),
			"generation" => Ok(Stage::Generation),
			_ => Err(crate::error::SessionError::Protocol(format!(
				"unknown stage key: {s}"
			))),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn stage_roundtrip(stage in prop_oneof![
			Just(Stage::Preprocessing),
			Just(Stage::Detection),
			Just(Stage::Ocr),
			Just(Stage::Layout),
			Just(Stage::Generation),
		]) {
			let s = stage.to_string();
			let parsed: Stage = s.parse().unwrap();
			prop_assert_eq!(stage, parsed);
		}
	}

	#[test]
	fn test_stage_order() {
		for window in STAGES.windows(2) {
			assert!(window[0] < window[1]);
		}
		assert_eq!(Stage::first(), Stage::Preprocessing);
		assert_eq!(Stage::Generation.position(), 4);
	}

	#[test]
	fn test_stage_parse_unknown() {
		assert!("decoding".parse::<Stage>().is_err());
		assert!("detection_complete".parse::<Stage>().is_err());
	}

	#[test]
	fn test_stage_serde_keys() {
		assert_eq!(serde_json::to_string(&Stage::Ocr).unwrap(), "\"ocr\"");
		let parsed: Stage = serde_json::from_str("\"layout\"").unwrap();
		assert_eq!(parsed, Stage::Layout);
	}
}
