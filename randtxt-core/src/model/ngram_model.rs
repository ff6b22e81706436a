use std::sync::Arc;

use log::{debug, trace};
use rand::Rng;
use rand::rngs::StdRng;

use crate::chain::{Chain, Link};
use crate::error::{Error, Result};
use crate::text::tag::Tag;

/// Random draws allowed when looking for a multi-gram context before the
/// chain is declared malformed.
const MAX_SEED_DRAWS: usize = 10_000;

/// Steps through a chain word by word and reports probabilities.
///
/// `Model` is the low-level cursor. `Generator` is the recommended way to
/// produce text.
///
/// # Invariants
/// - `past` holds the grams of a context drawn from or found in the chain
/// - `current` is empty until the first `step`
pub struct Model<C> {
	chain: Arc<C>,
	rng: StdRng,
	past: Vec<String>,
	current: String,
}

impl<C: Chain> Model<C> {
	/// Creates a model positioned at `seed`, a context of the chain. A blank
	/// `seed` picks a random context.
	///
	/// # Errors
	/// - `Error::NotFound` if `seed` is not in the chain
	/// - `Error::MalformedChain` if `seed` is a single gram, holds a gram
	///   that is not `text/POS`, or no multi-gram context could be drawn
	pub fn new(chain: Arc<C>, seed: &str, mut rng: StdRng) -> Result<Self> {
		let seed = if seed.is_empty() {
			random_seed(&*chain, &mut rng)?
		} else {
			seed.to_owned()
		};

		// Make sure the seed exists.
		chain.find(&seed)?;

		check_context(&seed)?;
		let past = split_context(&seed);

		Ok(Self {
			chain,
			rng,
			past,
			current: String::new(),
		})
	}

	/// The tag the model is currently at, or the null tag before the first
	/// step.
	pub fn current(&self) -> Tag {
		Tag::parse(&self.current)
	}

	/// Grams of the current context, oldest first.
	pub fn past(&self) -> &[String] {
		&self.past
	}

	/// Returns the tags that could come next with their probabilities.
	///
	/// A context without continuations reseeds the model at a random
	/// context first, so the result is never empty. Reseeding is not
	/// bounded: if no context of the chain has a continuation this loops
	/// forever.
	pub fn next_tags(&mut self) -> Result<Vec<TagProbability>> {
		self.next_links()?
			.into_iter()
			.map(|link| {
				Ok(TagProbability {
					raw: self.chain.get(link.id)?,
					probability: link.probability,
				})
			})
			.collect()
	}

	/// Advances the model by one tag.
	pub fn step(&mut self) -> Result<()> {
		let next = self.pick_next()?;
		trace!("stepped to {next}");

		// Shift the past grams to the left to make room for the new one.
		self.past.rotate_left(1);
		if let Some(last) = self.past.last_mut() {
			last.clone_from(&next);
		}

		self.current = next;
		Ok(())
	}

	/// Inverse-CDF draw over the outgoing links.
	fn pick_next(&mut self) -> Result<String> {
		let links = self.next_links()?;

		let draw: f64 = self.rng.random();
		let mut passed = 0.0;

		for link in &links {
			passed += link.probability;
			if passed > draw {
				return self.chain.get(link.id);
			}
		}

		Err(Error::Sampling { draw, links: links.len() })
	}

	fn next_links(&mut self) -> Result<Vec<Link>> {
		loop {
			let id = self.chain.find(&self.past.join(" "))?;
			let links = self.chain.links(id)?;
			if !links.is_empty() {
				return Ok(links);
			}

			// The context ended a unique phrase. Restart at a random point,
			// possibly mid-sentence.
			debug!("dead end at {:?}, reseeding", self.past.join(" "));
			self.reseed()?;
		}
	}

	fn reseed(&mut self) -> Result<()> {
		let seed = random_seed(&*self.chain, &mut self.rng)?;
		self.past = split_context(&seed);
		Ok(())
	}
}

/// Draws random entries until one is a multi-gram context.
fn random_seed<C: Chain>(chain: &C, rng: &mut StdRng) -> Result<String> {
	for _ in 0..MAX_SEED_DRAWS {
		let raw = chain.random(rng)?;
		if raw.split(' ').count() > 1 {
			return Ok(raw);
		}
	}

	Err(Error::MalformedChain(format!(
		"no multi-gram context found in {MAX_SEED_DRAWS} draws"
	)))
}

/// Checks that `context` is at least two `text/POS` grams with non-empty
/// text and POS, and returns the number of grams.
pub(crate) fn check_context(context: &str) -> Result<usize> {
	let grams: Vec<&str> = context.split(' ').collect();
	if grams.len() < 2 {
		return Err(Error::MalformedChain(format!(
			"{context:?} has ngram size of {}, want at least 2",
			grams.len()
		)));
	}

	for gram in &grams {
		let tag = Tag::parse(gram);
		if tag.text.is_empty() || tag.pos.is_empty() {
			return Err(Error::MalformedChain(format!("unrecognized tag format {gram:?}")));
		}
	}

	Ok(grams.len())
}

fn split_context(context: &str) -> Vec<String> {
	context.split(' ').map(str::to_owned).collect()
}

/// A tag and the probability that it comes next.
///
/// Returned by `Model::next_tags`.
#[derive(Clone, Debug, PartialEq)]
pub struct TagProbability {
	raw: String,
	pub probability: f64,
}

impl TagProbability {
	/// Decodes the tag.
	pub fn tag(&self) -> Tag {
		Tag::parse(&self.raw)
	}
}
