//! Tagged tokens and the rules for cleaning and rendering them.

/// A word paired with its part-of-speech label.
pub mod tag;

/// Normalization and rendering rules for a tagset.
pub mod tag_set;
