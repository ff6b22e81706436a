//! Learning tagged text into a chain and walking it back into prose.
//!
//! - `Builder` normalizes tags and writes n-gram transitions
//! - `Model` is a cursor over the chain with weighted sampling
//! - `Generator` renders paragraphs from a background walk

/// Normalization and n-gram encoding of tag streams.
pub mod builder;

/// Paragraph generation on top of `Model`.
pub mod generator;

/// Stateful cursor over a chain.
pub mod ngram_model;

/// Background walk handing tags over one at a time.
pub mod stream;
