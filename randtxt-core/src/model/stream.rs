use std::panic;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

use log::{debug, warn};
use rand::rngs::StdRng;

use super::ngram_model::Model;
use crate::chain::Chain;
use crate::error::Result;
use crate::text::tag::Tag;

/// An endless stream of tags walked from a chain on a background thread.
///
/// The producer hands over one tag at a time through a rendezvous channel,
/// so it never runs ahead of the consumer by more than the tag it is
/// offering. Dropping the stream cancels the walk: the producer's pending
/// handoff fails and the thread exits.
///
/// The stream yields the grams of the random seed context first, then one
/// tag per model step. It ends after yielding an error, or without one if
/// the walk panicked.
pub struct TagStream {
	rx: Option<Receiver<Result<Tag>>>,
	cancelled: Arc<AtomicBool>,
}

impl TagStream {
	pub(crate) fn spawn<C>(chain: Arc<C>, rng: StdRng) -> Result<Self>
	where
		C: Chain + 'static,
	{
		let (tx, rx) = mpsc::sync_channel(0);
		let cancelled = Arc::new(AtomicBool::new(false));
		let flag = Arc::clone(&cancelled);

		thread::Builder::new()
			.name("randtxt-walk".to_owned())
			.spawn(move || {
				let walk = panic::AssertUnwindSafe(|| produce(chain, rng, &tx, &flag));
				if panic::catch_unwind(walk).is_err() {
					warn!("walk panicked, closing the tag stream");
				}
			})?;

		Ok(Self {
			rx: Some(rx),
			cancelled,
		})
	}

	/// Stops the producer. Called on drop.
	pub fn cancel(&mut self) {
		self.cancelled.store(true, Ordering::Release);
		// Closing the receiver wakes a producer blocked in `send`.
		self.rx = None;
	}
}

impl Iterator for TagStream {
	type Item = Result<Tag>;

	fn next(&mut self) -> Option<Result<Tag>> {
		self.rx.as_ref()?.recv().ok()
	}
}

impl Drop for TagStream {
	fn drop(&mut self) {
		self.cancel();
	}
}

fn produce<C: Chain>(chain: Arc<C>, rng: StdRng, tx: &SyncSender<Result<Tag>>, cancelled: &AtomicBool) {
	let mut model = match Model::new(chain, "", rng) {
		Ok(model) => model,
		Err(err) => {
			offer(tx, cancelled, Err(err));
			return;
		}
	};

	for gram in model.past().to_vec() {
		if !offer(tx, cancelled, Ok(Tag::parse(&gram))) {
			return;
		}
	}

	loop {
		let next = model.step().map(|()| model.current());
		let failed = next.is_err();
		if !offer(tx, cancelled, next) || failed {
			if failed {
				warn!("walk stopped on error");
			}
			return;
		}
	}
}

/// Hands `item` to the consumer. Returns false once the consumer is gone.
fn offer(tx: &SyncSender<Result<Tag>>, cancelled: &AtomicBool, item: Result<Tag>) -> bool {
	if cancelled.load(Ordering::Acquire) || tx.send(item).is_err() {
		debug!("walk cancelled");
		return false;
	}
	true
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicUsize;
	use std::time::Duration;

	use rand::{Rng, SeedableRng};

	use super::*;
	use crate::chain::{Link, MemoryChain, NodeId, WriteChain};
	use crate::error::Error;

	fn cycle() -> MemoryChain {
		let mut chain = MemoryChain::default();
		let ab = chain.add("a/DT b/NN").unwrap();
		let a = chain.add("a/DT").unwrap();
		let ba = chain.add("b/NN a/DT").unwrap();
		let b = chain.add("b/NN").unwrap();
		chain.relate(ab, a, 1).unwrap();
		chain.relate(a, ba, 1).unwrap();
		chain.relate(ba, b, 1).unwrap();
		chain.relate(b, ab, 1).unwrap();
		chain
	}

	#[test]
	fn yields_seed_then_steps() {
		let stream = TagStream::spawn(Arc::new(cycle()), StdRng::seed_from_u64(9)).unwrap();
		let tags: Vec<Tag> = stream.take(6).collect::<Result<_>>().unwrap();

		for pair in tags.windows(2) {
			assert_ne!(pair[0], pair[1]);
		}
	}

	#[test]
	fn ends_after_error() {
		let empty = Arc::new(MemoryChain::default());
		let mut stream = TagStream::spawn(empty, StdRng::seed_from_u64(9)).unwrap();
		assert!(matches!(stream.next(), Some(Err(Error::EmptyChain))));
		assert!(stream.next().is_none());
	}

	#[test]
	fn cancelled_stream_yields_nothing() {
		let mut stream = TagStream::spawn(Arc::new(cycle()), StdRng::seed_from_u64(9)).unwrap();
		assert!(stream.next().is_some());
		stream.cancel();
		assert!(stream.next().is_none());
	}

	/// Counts lookups, or panics on the first `links` call when `panic` is
	/// set.
	struct Watched {
		inner: MemoryChain,
		lookups: Arc<AtomicUsize>,
		panic: bool,
	}

	impl Watched {
		fn new(panic: bool) -> (Arc<Self>, Arc<AtomicUsize>) {
			let lookups = Arc::new(AtomicUsize::new(0));
			let chain = Self {
				inner: cycle(),
				lookups: Arc::clone(&lookups),
				panic,
			};
			(Arc::new(chain), lookups)
		}
	}

	impl Chain for Watched {
		fn get(&self, id: NodeId) -> Result<String> {
			self.inner.get(id)
		}

		fn find(&self, value: &str) -> Result<NodeId> {
			self.lookups.fetch_add(1, Ordering::SeqCst);
			self.inner.find(value)
		}

		fn links(&self, id: NodeId) -> Result<Vec<Link>> {
			assert!(!self.panic, "links requested from a broken chain");
			self.lookups.fetch_add(1, Ordering::SeqCst);
			self.inner.links(id)
		}

		fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String> {
			self.inner.random(rng)
		}

		fn len(&self) -> usize {
			self.inner.len()
		}
	}

	#[test]
	fn producer_stops_after_drop() {
		let (chain, lookups) = Watched::new(false);
		let mut stream = TagStream::spawn(chain, StdRng::seed_from_u64(2)).unwrap();

		// One find for the seed, its two grams, then eight steps of one find
		// and one links each.
		for _ in 0..10 {
			stream.next().unwrap().unwrap();
		}
		drop(stream);

		thread::sleep(Duration::from_millis(50));
		let settled = lookups.load(Ordering::SeqCst);
		thread::sleep(Duration::from_millis(100));

		assert_eq!(lookups.load(Ordering::SeqCst), settled);
		// At most one step beyond the last tag taken.
		assert!((17..=19).contains(&settled), "got {settled} lookups");
	}

	#[test]
	fn panicking_walk_closes_stream() {
		let (chain, _) = Watched::new(true);
		let stream = TagStream::spawn(chain, StdRng::seed_from_u64(2)).unwrap();

		let tags: Vec<Result<Tag>> = stream.collect();
		assert_eq!(tags.len(), 2);
		assert!(tags.iter().all(|tag| tag.is_ok()));
	}
}
