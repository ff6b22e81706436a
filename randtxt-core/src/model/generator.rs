use std::io::Write;
use std::sync::Arc;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ngram_model::check_context;
use super::stream::TagStream;
use crate::chain::Chain;
use crate::error::{Error, Result};
use crate::text::tag::Tag;
use crate::text::tag_set::{PennTreebank, TagSet};

/// Generates random prose from a chain built by `Builder`.
///
/// # Responsibilities
/// - Validate that the chain holds tagged n-grams
/// - Walk the chain on a background thread
/// - Render whole sentences with the tagset's joining rules
pub struct Generator<C> {
	chain: Arc<C>,
	ngram_size: usize,
	tag_set: Arc<dyn TagSet>,
	rng: StdRng,
}

impl<C: Chain + 'static> Generator<C> {
	/// Creates a generator over `chain`, using the Penn Treebank rules and
	/// an OS-seeded random source.
	///
	/// # Errors
	/// Returns `Error::MalformedChain` if the root entry of the chain is not
	/// a context of at least two `text/POS` grams.
	pub fn new(chain: Arc<C>) -> Result<Self> {
		let ngram_size = inspect_chain(&*chain)?;
		debug!("chain has {} nodes, ngram size {ngram_size}", chain.len());

		Ok(Self {
			chain,
			ngram_size,
			tag_set: Arc::new(PennTreebank),
			rng: StdRng::from_os_rng(),
		})
	}

	/// Replaces the random source, e.g. with a seeded one.
	pub fn with_rng(mut self, rng: StdRng) -> Self {
		self.rng = rng;
		self
	}

	pub fn with_tag_set(mut self, tag_set: Arc<dyn TagSet>) -> Self {
		self.tag_set = tag_set;
		self
	}

	/// Number of grams in each context of the chain.
	pub fn ngram_size(&self) -> usize {
		self.ngram_size
	}

	/// Starts a walk from a random context. Dropping the stream stops it.
	pub fn tags(&mut self) -> Result<TagStream> {
		TagStream::spawn(Arc::clone(&self.chain), StdRng::from_rng(&mut self.rng))
	}

	/// Returns a paragraph of between `min` (inclusive) and `max`
	/// (exclusive) sentences.
	///
	/// The walk starts at a random point, so the sentence in progress is
	/// skipped and the paragraph starts with the next one.
	///
	/// # Errors
	/// - `Error::InvalidRange` if `max <= min`
	/// - any error from the walk; no partial text is returned
	///
	/// # Notes
	/// Dead ends are recovered from by reseeding without limit. On a chain
	/// where every context is a dead end (e.g. built from a single source of
	/// exactly `ngram_size` tags) this never returns, and the background
	/// walk keeps running after the caller gives up.
	pub fn paragraph(&mut self, min: usize, max: usize) -> Result<String> {
		if max <= min {
			return Err(Error::InvalidRange { min, max });
		}

		let total = self.rng.random_range(min..max);
		let mut tags = self.tags()?;

		// Skip to the end of the current sentence.
		loop {
			let tag = next_tag(&mut tags)?;
			if self.tag_set.ends_sentence(&tag) {
				break;
			}
		}

		let mut text = String::new();
		let mut last = Tag::null();
		let mut generated = 0;

		while generated < total {
			let tag = next_tag(&mut tags)?;
			text.push_str(&self.tag_set.join(&tag, &last));

			if self.tag_set.ends_sentence(&tag) {
				generated += 1;
			}

			last = tag;
		}

		Ok(text)
	}

	/// Writes a paragraph to `w`. Nothing is written if generation fails.
	pub fn write_paragraph<W: Write>(&mut self, w: &mut W, min: usize, max: usize) -> Result<()> {
		let text = self.paragraph(min, max)?;
		w.write_all(text.as_bytes())?;
		Ok(())
	}
}

fn next_tag(tags: &mut TagStream) -> Result<Tag> {
	tags.next().unwrap_or(Err(Error::StreamClosed))
}

/// Checks the root entry and returns the ngram size of the chain.
fn inspect_chain<C: Chain>(chain: &C) -> Result<usize> {
	if chain.is_empty() {
		return Err(Error::EmptyChain);
	}

	check_context(&chain.get(0)?)
}
