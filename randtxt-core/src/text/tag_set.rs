use super::tag::Tag;

/// Language and tagset specific rules.
///
/// `normalize` cleans tags up before they are learned, `join` renders them
/// back into prose. Both receive the tag that came before, which is the null
/// tag at the start of the text.
pub trait TagSet: Send + Sync {
	/// Returns the text of `tag` prefixed with whatever separator belongs
	/// between `prev` and `tag`.
	fn join(&self, tag: &Tag, prev: &Tag) -> String;

	/// Converts `tag` to a consistent form. A result with empty text means
	/// the token must be dropped.
	fn normalize(&self, tag: Tag, prev: &Tag) -> Tag;

	/// Whether `tag` terminates a sentence.
	fn ends_sentence(&self, tag: &Tag) -> bool;
}

const SENTENCE_END: &str = ".";

/// Rules for the English Penn Treebank tagset, as produced by the Stanford
/// POS tagger.
///
/// <https://www.ling.upenn.edu/courses/Fall_2003/ling001/penn_treebank_pos.html>
#[derive(Clone, Copy, Debug, Default)]
pub struct PennTreebank;

impl TagSet for PennTreebank {
	fn join(&self, tag: &Tag, prev: &Tag) -> String {
		let need_space = match tag.pos.as_str() {
			"." | "," | ":" | "POS" => false,
			"RB" => tag.text != "n't",
			"VBZ" => !tag.text.starts_with('\''),
			_ => true,
		};

		let mut out = String::with_capacity(tag.text.len() + 1);
		if !prev.is_null() && need_space {
			out.push(' ');
		}

		match prev.pos.as_str() {
			"" | "." | ":" if prev.text != ";" => out.push_str(&title_case(&tag.text)),
			_ => out.push_str(&tag.text),
		}

		out
	}

	fn normalize(&self, mut tag: Tag, prev: &Tag) -> Tag {
		match tag.pos.as_str() {
			"-LRB-" | "``" | "-RRB-" | "''" | "SYM" => return Tag::null(),
			_ => {}
		}

		// Sentence openers are lower cased unless they are proper nouns.
		if (prev.is_null() || prev.pos == SENTENCE_END)
			&& tag.text != "I"
			&& tag.pos != "NNP"
			&& tag.pos != "NNPS"
		{
			tag.text = tag.text.to_lowercase();
		}

		if tag.pos != "POS" && tag.pos != "VBZ" {
			tag.text = tag.text.trim_start_matches('\'').to_owned();
		}

		tag
	}

	fn ends_sentence(&self, tag: &Tag) -> bool {
		tag.pos == SENTENCE_END
	}
}

fn title_case(text: &str) -> String {
	let mut chars = text.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
