use std::fmt;

use serde::{Deserialize, Serialize};

/// A word and its part-of-speech label.
///
/// The canonical encoding is `text/POS`. A tag with both fields empty is the
/// null tag, which stands for "nothing before this" (start of text) and is
/// never a real token.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tag {
	pub text: String,
	pub pos: String,
}

impl Tag {
	pub fn new(text: impl Into<String>, pos: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			pos: pos.into(),
		}
	}

	/// Returns the null tag.
	pub fn null() -> Self {
		Self::default()
	}

	pub fn is_null(&self) -> bool {
		self.text.is_empty() && self.pos.is_empty()
	}

	/// Decodes a `text/POS` gram, splitting on the first `/`.
	///
	/// A gram without a `/` is not a valid token and decodes to the null tag.
	pub fn parse(gram: &str) -> Self {
		match gram.split_once('/') {
			Some((text, pos)) => Self::new(text, pos),
			None => Self::null(),
		}
	}
}

impl fmt::Display for Tag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.text, self.pos)
	}
}

impl From<&str> for Tag {
	fn from(gram: &str) -> Self {
		Self::parse(gram)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn encodes_as_text_slash_pos() {
		assert_eq!(Tag::new("ran", "VBD").to_string(), "ran/VBD");
	}

	#[test]
	fn decodes_what_it_encodes() {
		for tag in [Tag::new("Paul", "NNP"), Tag::new(".", "."), Tag::new("'s", "POS"), Tag::new("n't", "RB")] {
			assert_eq!(Tag::parse(&tag.to_string()), tag);
		}
	}

	#[test]
	fn splits_on_first_slash() {
		assert_eq!(Tag::parse("a/b/c"), Tag::new("a", "b/c"));
	}

	#[test]
	fn gram_without_slash_is_null() {
		assert!(Tag::parse("Paul;NN").is_null());
		assert!(Tag::parse("").is_null());
	}

	#[test]
	fn null_needs_both_fields_empty() {
		assert!(Tag::null().is_null());
		assert!(!Tag::new("", "NN").is_null());
		assert!(!Tag::new("x", "").is_null());
	}
}
