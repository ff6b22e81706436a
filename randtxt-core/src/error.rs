use thiserror::Error;

/// Errors produced while building or walking a chain.
///
/// Dead ends (a context with no outgoing links) are not errors: the model
/// recovers from them by reseeding.
#[derive(Debug, Error)]
pub enum Error {
	/// The chain does not hold tagged n-grams in the expected format.
	#[error("malformed chain: {0}")]
	MalformedChain(String),

	/// A context was looked up but is not present in the chain.
	#[error("{0:?} not found in chain")]
	NotFound(String),

	/// A link pointed at a node the chain does not have.
	#[error("no node with id {0}")]
	UnknownId(usize),

	/// The weighted draw did not land on any link. Only happens when the
	/// link probabilities of a node do not add up to 1.0.
	#[error("weighted draw {draw} did not resolve to any of {links} links")]
	Sampling { draw: f64, links: usize },

	#[error("chain is empty")]
	EmptyChain,

	#[error("ngram size must be at least 2, got {0}")]
	InvalidNgramSize(usize),

	#[error("invalid sentence range {min}..{max}, max must be greater than min")]
	InvalidRange { min: usize, max: usize },

	/// The background tag producer stopped without delivering a result.
	#[error("tag stream closed unexpectedly")]
	StreamClosed,

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Encoding(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
