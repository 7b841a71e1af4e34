// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Append-only accumulator for streamed code fragments.

/// The accumulating output artifact of one session.
///
/// Fragments arrive in order and may split mid-token; they are
/// concatenated verbatim. The buffer only grows until the session reaches
/// a terminal status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifact {
	buf: String,
}

impl Artifact {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Append one fragment in arrival order.
	pub fn append(&mut self, fragment: &str) {
		self.buf.push_str(fragment);
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	/// The raw accumulated text, fences and all.
	#[must_use]
	pub fn raw(&self) -> &str {
		&self.buf
	}

	/// The user-facing artifact: the raw buffer with a single surrounding
	/// markdown code fence (optionally tagged with a language hint)
	/// stripped, and outer whitespace trimmed. Content without fence
	/// markers passes through untouched apart from the trim.
	#[must_use]
	pub fn final_artifact(&self) -> String {
		strip_code_fence(&self.buf)
	}
}

/// Strip one leading and one trailing fence line if present.
fn strip_code_fence(raw: &str) -> String {
	let mut out = raw.trim();

	if let Some(rest) = out.strip_prefix("```") {
		// Drop the whole fence line, language hint included.
		out = match rest.find('\n') {
			Some(idx) => &rest[idx + 1..],
			None => "",
		};
	}

	out = out.trim_end();
	if let Some(rest) = out.strip_suffix("```") {
		// Only a fence on its own line closes the block.
		match rest.strip_suffix('\n') {
			Some(body) => out = body,
			None if rest.is_empty() => out = rest,
			None => {}
		}
	}

	out.trim().to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_append_preserves_arrival_order() {
		let mut artifact = Artifact::new();
		artifact.append("ab");
		artifact.append("cd");
		artifact.append("ef");
		assert_eq!(artifact.raw(), "abcdef");
	}

	#[test]
	fn test_fragments_may_split_mid_token() {
		let mut artifact = Artifact::new();
		artifact.append("<di");
		artifact.append("v>hello</");
		artifact.append("div>");
		assert_eq!(artifact.final_artifact(), "<div>hello</div>");
	}

	#[test]
	fn test_strips_tagged_fence() {
		let mut artifact = Artifact::new();
		artifact.append("```html\n<div>hello</div>\n```");
		assert_eq!(artifact.final_artifact(), "<div>hello</div>");
	}

	#[test]
	fn test_strips_bare_fence() {
		let mut artifact = Artifact::new();
		artifact.append("```\nconst x = 1;\n```\n");
		assert_eq!(artifact.final_artifact(), "const x = 1;");
	}

	#[test]
	fn test_unfenced_content_only_trimmed() {
		let mut artifact = Artifact::new();
		artifact.append("  <div>hello</div>\n");
		assert_eq!(artifact.final_artifact(), "<div>hello</div>");
	}

	#[test]
	fn test_inner_backticks_survive() {
		let mut artifact = Artifact::new();
		artifact.append("```jsx\nconst s = `template`;\n```");
		assert_eq!(artifact.final_artifact(), "const s = `template`;");
	}

	#[test]
	fn test_empty_fence_block() {
		let mut artifact = Artifact::new();
		artifact.append("```\n```");
		assert_eq!(artifact.final_artifact(), "");
	}

	proptest! {
		/// Stripping twice yields the same result as stripping once, for
		/// generated code bodies with and without a surrounding fence.
		#[test]
		fn strip_is_idempotent(
			body in "[ -~&&[^`]]{0,80}",
			lang in prop_oneof![Just(""), Just("html"), Just("jsx")],
			fenced in any::<bool>(),
		) {
			let raw = if fenced {
				format!("```{lang}\n{body}\n```")
			} else {
				body.clone()
			};
			let once = strip_code_fence(&raw);
			let twice = strip_code_fence(&once);
			prop_assert_eq!(&once, &twice);
			prop_assert_eq!(once, body.trim());
		}
	}
}
