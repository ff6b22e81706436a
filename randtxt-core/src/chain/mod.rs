//! The weighted transition store that n-grams are learned into and walked
//! from.
//!
//! Content values are plain strings; the encoding of tags, contexts and
//! continuations into those strings belongs to the `model` module.

use std::sync::mpsc;
use std::thread;

use log::{debug, warn};
use rand::Rng;

use crate::error::Result;

/// In-memory store with postcard persistence.
pub mod memory;

pub use memory::MemoryChain;

/// Identifier of a node in a chain.
pub type NodeId = usize;

/// An outgoing transition and its normalized probability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
	pub id: NodeId,
	pub probability: f64,
}

/// Read side of a transition store.
///
/// Implementations are shared between concurrent walks and must tolerate
/// being queried from several threads at once.
pub trait Chain: Send + Sync {
	/// Returns the content stored under `id`.
	fn get(&self, id: NodeId) -> Result<String>;

	/// Looks up the id of `value`. Fails with `Error::NotFound` when the
	/// value was never added.
	fn find(&self, value: &str) -> Result<NodeId>;

	/// Outgoing links of `id`, whose probabilities add up to 1.0.
	///
	/// A node without outgoing transitions returns an empty list.
	fn links(&self, id: NodeId) -> Result<Vec<Link>>;

	/// Returns the content of a randomly chosen node.
	fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String>;

	/// Number of nodes.
	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Write side of a transition store.
pub trait WriteChain {
	/// Adds `value` and returns its id. Adding a known value returns the
	/// existing id.
	fn add(&mut self, value: &str) -> Result<NodeId>;

	/// Increases the weight of the transition `from -> to` by `weight`.
	fn relate(&mut self, from: NodeId, to: NodeId, weight: usize) -> Result<()>;
}

/// Learns every stream into `chain`, linking each item to the one that
/// follows it on the same stream.
///
/// Each stream is consumed on its own thread into a partial chain, and the
/// partials are merged into `chain` as they complete. Streams are
/// independent: no order between them is assumed. Ingestion is not
/// transactional, if a merge fails the partials merged before it stay.
pub fn feed<W, S>(chain: &mut W, streams: Vec<S>) -> Result<()>
where
	W: WriteChain + ?Sized,
	S: IntoIterator<Item = String> + Send,
{
	thread::scope(|scope| {
		let (tx, rx) = mpsc::channel();

		for (index, stream) in streams.into_iter().enumerate() {
			let tx = tx.clone();
			scope.spawn(move || {
				let partial = MemoryChain::from_sequence(stream);
				if tx.send((index, partial)).is_err() {
					warn!("ingestion stopped before stream {index} was merged");
				}
			});
		}
		drop(tx);

		for (index, partial) in rx {
			debug!("merging stream {index} ({} nodes)", partial.len());
			partial.merge_into(chain)?;
		}

		Ok(())
	})
}
