// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The one-shot outbound request payload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult};

/// Target framework for the generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
	/// React components styled with Tailwind.
	React,
	/// Plain HTML styled with Tailwind.
	Html,
}

impl Framework {
	/// Filename for the downloaded artifact.
	#[must_use]
	pub fn output_filename(self) -> &'static str {
		match self {
			Framework::React => "App.jsx",
			Framework::Html => "index.html",
		}
	}
}

impl std::fmt::Display for Framework {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Framework::React => write!(f, "react"),
			Framework::Html => write!(f, "html"),
		}
	}
}

impl std::str::FromStr for Framework {
	type Err = SessionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"react" => Ok(Framework::React),
			"html" => Ok(Framework::Html),
			_ => Err(SessionError::Input(format!("unknown framework: {s}"))),
		}
	}
}

/// The request sent to the backend, once, immediately after the
/// connection opens.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
	/// Base64 data URI of the input image.
	pub image: String,
	pub framework: Framework,
}

impl GenerateRequest {
	/// Build the payload from raw image bytes.
	///
	/// The MIME type is sniffed from magic bytes; empty or unrecognized
	/// input is an input error and no connection should be opened for it.
	pub fn from_image_bytes(bytes: &[u8], framework: Framework) -> SessionResult<Self> {
		if bytes.is_empty() {
			return Err(SessionError::Input("image is empty".to_string()));
		}

		let mime = sniff_image_mime(bytes)
			.ok_or_else(|| SessionError::Input("unrecognized image format".to_string()))?;

		Ok(Self {
			image: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
			framework,
		})
	}
}

/// Sniff the MIME type of an image from its magic bytes.
fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
	if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
		Some("image/png")
	} else if bytes.starts_with(b"\xff\xd8\xff") {
		Some("image/jpeg")
	} else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
		Some("image/gif")
	} else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
		Some("image/webp")
	} else if bytes.starts_with(b"BM") {
		Some("image/bmp")
	} else {
		None
	}
}

/// A 1x1 transparent PNG, handy for tests and smoke checks.
#[cfg(any(test, feature = "test-fixtures"))]
pub const TINY_PNG: [u8; 67] = [
	0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
	0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
	0x89, 0x00, 0x00, 0x00, 0x0b, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00, 0x01, 0x00, 0x00,
	0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae,
	0x42, 0x60, 0x82,
];

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_payload_is_data_uri() {
		let request = GenerateRequest::from_image_bytes(&TINY_PNG, Framework::React).unwrap();
		assert!(request.image.starts_with("data:image/png;base64,"));
		assert_eq!(request.framework, Framework::React);
	}

	#[test]
	fn test_payload_roundtrips_image_bytes() {
		let request = GenerateRequest::from_image_bytes(&TINY_PNG, Framework::Html).unwrap();
		let encoded = request.image.split(',').nth(1).unwrap();
		assert_eq!(STANDARD.decode(encoded).unwrap(), TINY_PNG);
	}

	#[test]
	fn test_payload_wire_shape() {
		let request = GenerateRequest::from_image_bytes(&TINY_PNG, Framework::Html).unwrap();
		let json: serde_json::Value = serde_json::to_value(&request).unwrap();
		assert_eq!(json["framework"], "html");
		assert!(json["image"].as_str().unwrap().contains(";base64,"));
	}

	#[test]
	fn test_empty_image_rejected() {
		let err = GenerateRequest::from_image_bytes(&[], Framework::React).unwrap_err();
		assert!(matches!(err, SessionError::Input(_)));
	}

	#[test]
	fn test_unrecognized_image_rejected() {
		let err = GenerateRequest::from_image_bytes(b"definitely not an image", Framework::React)
			.unwrap_err();
		assert!(matches!(err, SessionError::Input(_)));
	}

	#[test]
	fn test_mime_sniffing() {
		assert_eq!(sniff_image_mime(&TINY_PNG), Some("image/png"));
		assert_eq!(sniff_image_mime(b"\xff\xd8\xff\xe0rest"), Some("image/jpeg"));
		assert_eq!(sniff_image_mime(b"GIF89a..."), Some("image/gif"));
		assert_eq!(
			sniff_image_mime(b"RIFF\x00\x00\x00\x00WEBPVP8 "),
			Some("image/webp")
		);
		assert_eq!(sniff_image_mime(b"BM\x00\x00"), Some("image/bmp"));
		assert_eq!(sniff_image_mime(b"<svg/>"), None);
	}

	#[test]
	fn test_framework_parse_and_filenames() {
		assert_eq!("react".parse::<Framework>().unwrap(), Framework::React);
		assert_eq!("html".parse::<Framework>().unwrap(), Framework::Html);
		assert!("vue".parse::<Framework>().is_err());
		assert_eq!(Framework::React.output_filename(), "App.jsx");
		assert_eq!(Framework::Html.output_filename(), "index.html");
	}
}
