use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Chain, Link, NodeId, WriteChain};
use crate::error::{Error, Result};

/// A node of the chain: a stored value and its outgoing transitions.
///
/// Transitions are kept in the order they were first observed so that
/// `links` is stable between calls and across save/load.
///
/// ## Invariants
/// - Each transition target appears once
/// - Each occurrence count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug)]
struct State {
	value: String,
	/// (target, occurrences)
	transitions: Vec<(NodeId, usize)>,
}

impl State {
	fn new(value: &str) -> Self {
		Self {
			value: value.to_owned(),
			transitions: Vec::new(),
		}
	}

	/// Records `occurrences` more observations of the transition to `next`.
	fn add_transition(&mut self, next: NodeId, occurrences: usize) {
		match self.transitions.iter_mut().find(|(id, _)| *id == next) {
			Some((_, count)) => *count += occurrences,
			None => self.transitions.push((next, occurrences)),
		}
	}

	/// Transitions with their occurrence counts normalized to probabilities.
	fn links(&self) -> Vec<Link> {
		let total: usize = self.transitions.iter().map(|(_, occurrences)| occurrences).sum();
		if total == 0 {
			return Vec::new();
		}

		self.transitions
			.iter()
			.map(|(id, occurrences)| Link {
				id: *id,
				probability: *occurrences as f64 / total as f64,
			})
			.collect()
	}
}

/// A transition store held in memory.
///
/// Ids are assigned in insertion order, so the first value ever added has
/// id 0. The whole chain can be written to disk with `postcard` and loaded
/// back.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct MemoryChain {
	states: Vec<State>,
	index: HashMap<String, NodeId>,
}

impl MemoryChain {
	/// Loads a chain previously written with `save`.
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = fs::read(&path)?;
		let chain: Self = postcard::from_bytes(&bytes)?;
		debug!("loaded {} nodes from {}", chain.len(), path.as_ref().display());
		Ok(chain)
	}

	/// Loads the chain at `path`, or returns an empty chain when the file
	/// does not exist yet.
	pub fn open_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
		if path.as_ref().exists() {
			Self::open(path)
		} else {
			Ok(Self::default())
		}
	}

	/// Serializes the chain to `path`, replacing any previous content.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let bytes = postcard::to_stdvec(self)?;
		fs::write(&path, bytes)?;
		debug!("saved {} nodes to {}", self.len(), path.as_ref().display());
		Ok(())
	}

	/// Builds a chain from one ordered sequence, linking each item to the
	/// next one.
	pub fn from_sequence<I: IntoIterator<Item = String>>(values: I) -> Self {
		let mut chain = Self::default();
		let mut prev: Option<NodeId> = None;

		for value in values {
			let id = chain.insert(&value);
			if let Some(prev) = prev {
				chain.states[prev].add_transition(id, 1);
			}
			prev = Some(id);
		}

		chain
	}

	/// Adds every node and transition of this chain to `target`.
	///
	/// Nodes are added in id order, so the root of this chain becomes the
	/// root of an empty target.
	pub fn merge_into<W: WriteChain + ?Sized>(&self, target: &mut W) -> Result<()> {
		let ids = self
			.states
			.iter()
			.map(|state| target.add(&state.value))
			.collect::<Result<Vec<_>>>()?;

		for (from, state) in self.states.iter().enumerate() {
			for (to, occurrences) in &state.transitions {
				target.relate(ids[from], ids[*to], *occurrences)?;
			}
		}

		Ok(())
	}

	fn insert(&mut self, value: &str) -> NodeId {
		if let Some(id) = self.index.get(value) {
			return *id;
		}

		let id = self.states.len();
		self.states.push(State::new(value));
		self.index.insert(value.to_owned(), id);
		id
	}

	fn state(&self, id: NodeId) -> Result<&State> {
		self.states.get(id).ok_or(Error::UnknownId(id))
	}
}

impl Chain for MemoryChain {
	fn get(&self, id: NodeId) -> Result<String> {
		Ok(self.state(id)?.value.clone())
	}

	fn find(&self, value: &str) -> Result<NodeId> {
		self.index
			.get(value)
			.copied()
			.ok_or_else(|| Error::NotFound(value.to_owned()))
	}

	fn links(&self, id: NodeId) -> Result<Vec<Link>> {
		Ok(self.state(id)?.links())
	}

	fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String> {
		if self.states.is_empty() {
			return Err(Error::EmptyChain);
		}

		let id = rng.random_range(0..self.states.len());
		Ok(self.states[id].value.clone())
	}

	fn len(&self) -> usize {
		self.states.len()
	}
}

impl WriteChain for MemoryChain {
	fn add(&mut self, value: &str) -> Result<NodeId> {
		Ok(self.insert(value))
	}

	fn relate(&mut self, from: NodeId, to: NodeId, weight: usize) -> Result<()> {
		if to >= self.states.len() {
			return Err(Error::UnknownId(to));
		}

		self.states
			.get_mut(from)
			.ok_or(Error::UnknownId(from))?
			.add_transition(to, weight);
		Ok(())
	}
}
