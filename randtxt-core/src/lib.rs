//! Readable random text from part-of-speech tagged corpora.
//!
//! This crate learns word transitions from tagged text and walks them back
//! into prose:
//! - Normalization and rendering rules per tagset (`TagSet`)
//! - N-gram encoding of tag streams into a weighted chain (`Builder`)
//! - Weighted random walks with dead-end recovery (`Model`)
//! - Paragraph generation with sentence-aware rendering (`Generator`)
//!
//! The chain itself sits behind the `Chain` / `WriteChain` traits;
//! `MemoryChain` is the in-memory implementation with on-disk persistence.

/// Transition store traits, multi-stream ingestion and `MemoryChain`.
pub mod chain;

/// Error type shared by the whole crate.
pub mod error;

/// Corpus and path helpers.
pub mod io;

/// Builder, model cursor and generator.
pub mod model;

/// Entropy measurements over a walk.
pub mod stats;

/// Tags and tagsets.
pub mod text;

pub use chain::{Chain, Link, MemoryChain, NodeId, WriteChain};
pub use error::{Error, Result};
pub use model::builder::{Builder, NgramEncoder};
pub use model::generator::Generator;
pub use model::ngram_model::{Model, TagProbability};
pub use model::stream::TagStream;
pub use text::tag::Tag;
pub use text::tag_set::{PennTreebank, TagSet};
