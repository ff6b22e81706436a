//! Entropy of the next-tag distribution along a walk.

use std::io::Write;

use crate::chain::Chain;
use crate::error::Result;
use crate::model::ngram_model::{Model, TagProbability};

/// Steps between two comparisons of the running mean.
const CHECKPOINT: usize = 1000;

/// The walk stops once the running mean moved less than this between two
/// checkpoints.
const TOLERANCE: f64 = 0.0001;

/// Shannon entropy, in bits, of a next-tag distribution.
pub fn entropy(next: &[TagProbability]) -> f64 {
	let sum: f64 = next
		.iter()
		.filter(|tp| tp.probability > 0.0)
		.map(|tp| tp.probability * tp.probability.log2())
		.sum();

	if sum == 0.0 { 0.0 } else { -sum }
}

/// Walks `model`, writing the entropy of each step on its own line, until
/// the mean settles down. Returns the number of steps taken.
pub fn write_entropy<W: Write, C: Chain>(w: &mut W, model: &mut Model<C>) -> Result<usize> {
	let mut sum = 0.0;
	let mut avg = 0.0;
	let mut steps = 0;

	loop {
		model.step()?;
		let e = entropy(&model.next_tags()?);
		writeln!(w, "{e}")?;

		sum += e;
		steps += 1;

		if steps % CHECKPOINT == 0 {
			let last_avg = avg;
			avg = sum / steps as f64;
			if (last_avg - avg).abs() < TOLERANCE {
				return Ok(steps);
			}
		}
	}
}
