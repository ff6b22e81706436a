use std::sync::Arc;

use crate::chain::{self, WriteChain};
use crate::error::{Error, Result};
use crate::text::tag::Tag;
use crate::text::tag_set::{PennTreebank, TagSet};

/// Learns tagged text into a chain.
///
/// Every source is normalized and cut into n-grams independently, on its
/// own thread. The chain ends up holding two kinds of entries: contexts
/// (`n` grams joined by spaces) and continuations (a single gram), linked
/// context -> continuation -> next context.
pub struct Builder<W> {
	chain: W,
	ngram_size: usize,
	tag_set: Arc<dyn TagSet>,
}

impl<W: WriteChain> Builder<W> {
	/// Creates a builder writing n-grams of `ngram_size` tags into `chain`.
	///
	/// # Errors
	/// Returns an error if `ngram_size < 2`.
	pub fn new(chain: W, ngram_size: usize) -> Result<Self> {
		if ngram_size < 2 {
			return Err(Error::InvalidNgramSize(ngram_size));
		}

		Ok(Self {
			chain,
			ngram_size,
			tag_set: Arc::new(PennTreebank),
		})
	}

	/// Replaces the default Penn Treebank rules.
	pub fn with_tag_set(mut self, tag_set: Arc<dyn TagSet>) -> Self {
		self.tag_set = tag_set;
		self
	}

	pub fn ngram_size(&self) -> usize {
		self.ngram_size
	}

	/// Feeds every source into the chain.
	///
	/// Sources are independent walks: nothing links the end of one source
	/// to the start of another. Not transactional, a failure leaves the
	/// sources merged before it in the chain.
	pub fn feed<S>(&mut self, sources: Vec<S>) -> Result<()>
	where
		S: IntoIterator<Item = Tag>,
		S::IntoIter: Send,
	{
		let encoders = sources
			.into_iter()
			.map(|source| NgramEncoder::new(source.into_iter(), self.ngram_size, Arc::clone(&self.tag_set)))
			.collect();

		chain::feed(&mut self.chain, encoders)
	}

	pub fn chain(&self) -> &W {
		&self.chain
	}

	/// Returns the chain that was fed.
	pub fn into_inner(self) -> W {
		self.chain
	}
}

/// Turns a stream of raw tags into chain entries.
///
/// Once the first `size` tags have been seen the window is emitted as a
/// context. After that, each new tag produces its own gram (the
/// continuation) followed by the slid window (the next context):
///
/// ```text
/// a b c d e  (size 3)  =>  "a b c", "d", "b c d", "e", "c d e"
/// ```
///
/// Tags that normalize to empty text, or that contain whitespace, are
/// dropped and do not count as the previous tag for the next normalization.
pub struct NgramEncoder<I> {
	tags: I,
	size: usize,
	tag_set: Arc<dyn TagSet>,
	window: Vec<String>,
	previous: Tag,
	pending: Option<String>,
}

impl<I: Iterator<Item = Tag>> NgramEncoder<I> {
	pub fn new(tags: I, size: usize, tag_set: Arc<dyn TagSet>) -> Self {
		Self {
			tags,
			size,
			tag_set,
			window: Vec::with_capacity(size),
			previous: Tag::null(),
			pending: None,
		}
	}
}

impl<I: Iterator<Item = Tag>> Iterator for NgramEncoder<I> {
	type Item = String;

	fn next(&mut self) -> Option<String> {
		if let Some(context) = self.pending.take() {
			return Some(context);
		}

		loop {
			let tag = self.tag_set.normalize(self.tags.next()?, &self.previous);
			if tag.text.is_empty() || has_whitespace(&tag) {
				continue;
			}

			let gram = tag.to_string();
			self.previous = tag;

			if self.window.len() < self.size {
				self.window.push(gram);
				if self.window.len() < self.size {
					continue;
				}
				return Some(self.window.join(" "));
			}

			// Slide the window left to make room for the new gram.
			self.window.rotate_left(1);
			self.window[self.size - 1] = gram.clone();
			self.pending = Some(self.window.join(" "));

			return Some(gram);
		}
	}
}

/// Grams are joined into contexts with spaces, so a tag holding whitespace
/// cannot be encoded.
fn has_whitespace(tag: &Tag) -> bool {
	tag.text.contains(char::is_whitespace) || tag.pos.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::chain::{Chain, MemoryChain};
	use crate::model::generator::Generator;

	fn letters(n: usize) -> Vec<Tag> {
		const LETTERS: [&str; 7] = ["A", "B", "C", "D", "E", "F", "G"];
		(0..n).map(|i| Tag::new(LETTERS[i % LETTERS.len()], "NNP")).collect()
	}

	fn encode(tags: Vec<Tag>, size: usize) -> Vec<String> {
		NgramEncoder::new(tags.into_iter(), size, Arc::new(PennTreebank)).collect()
	}

	#[test]
	fn alternates_contexts_and_continuations() {
		let entries = encode(letters(5), 3);
		assert_eq!(
			entries,
			vec!["A/NNP B/NNP C/NNP", "D/NNP", "B/NNP C/NNP D/NNP", "E/NNP", "C/NNP D/NNP E/NNP"]
		);
	}

	#[test]
	fn emission_count() {
		for size in 2..5 {
			for k in 0..12 {
				let expected = if k < size { 0 } else { 2 * (k - size) + 1 };
				assert_eq!(encode(letters(k), size).len(), expected, "k={k} size={size}");
			}
		}
	}

	#[test]
	fn drops_markers_and_normalizes_against_kept_tags() {
		let tags = vec![
			Tag::new("The", "DT"),
			Tag::new("(", "-LRB-"),
			Tag::new("Cat", "NN"),
			Tag::new("sat", "VBD"),
			Tag::new(".", "."),
			Tag::new("``", "``"),
			Tag::new("It", "PRP"),
		];

		let entries = encode(tags, 2);
		assert_eq!(
			entries,
			vec!["the/DT Cat/NN", "sat/VBD", "Cat/NN sat/VBD", "./.", "sat/VBD ./.", "it/PRP", "./. it/PRP"]
		);
	}

	#[test]
	fn drops_tags_with_whitespace() {
		let tags = vec![
			Tag::new("the", "DT"),
			Tag::new("New York", "NNP"),
			Tag::new("team", "NN"),
			Tag::new("won", "VB D"),
			Tag::new("won", "VBD"),
		];

		let entries = encode(tags, 2);
		assert_eq!(entries, vec!["the/DT team/NN", "won/VBD", "team/NN won/VBD"]);
	}

	#[test]
	fn chain_with_multiword_tokens_is_generatable() {
		let sentence = [
			Tag::new("the", "DT"),
			Tag::new("New York", "NNP"),
			Tag::new("team", "NN"),
			Tag::new("won", "VBD"),
			Tag::new(".", "."),
		];
		let stream: Vec<Tag> = sentence.iter().cycle().take(sentence.len() * 30).cloned().collect();

		let mut builder = Builder::new(MemoryChain::default(), 2).unwrap();
		builder.feed(vec![stream]).unwrap();
		let chain = Arc::new(builder.into_inner());

		for id in 0..chain.len() {
			let value = chain.get(id).unwrap();
			assert!(value.split(' ').all(|gram| !Tag::parse(gram).text.is_empty()), "{value}");
		}

		let mut generator = Generator::new(chain).unwrap().with_rng(StdRng::seed_from_u64(6));
		let text = generator.paragraph(1, 3).unwrap();
		assert!(!text.contains("New"), "{text}");
		assert!(text.ends_with('.'), "{text}");
	}

	#[test]
	fn rejects_unigrams() {
		assert!(matches!(
			Builder::new(MemoryChain::default(), 1),
			Err(Error::InvalidNgramSize(1))
		));
	}

	#[test]
	fn builds_trigram_chain() {
		let mut builder = Builder::new(MemoryChain::default(), 3).unwrap();
		builder.feed(vec![letters(100)]).unwrap();
		let chain = builder.into_inner();

		assert_eq!(chain.get(0).unwrap(), "A/NNP B/NNP C/NNP");

		let links = chain.links(0).unwrap();
		assert_eq!(links.len(), 1);
		assert_eq!(chain.get(links[0].id).unwrap(), "D/NNP");
		assert!((links[0].probability - 1.0).abs() < 1e-9);
	}

	#[test]
	fn continuation_leads_to_next_context() {
		let mut builder = Builder::new(MemoryChain::default(), 3).unwrap();
		builder.feed(vec![letters(100)]).unwrap();
		let chain = builder.into_inner();

		let d = chain.find("D/NNP").unwrap();
		let next = chain.links(d).unwrap();
		assert_eq!(next.len(), 1);
		assert_eq!(chain.get(next[0].id).unwrap(), "B/NNP C/NNP D/NNP");
	}
}
