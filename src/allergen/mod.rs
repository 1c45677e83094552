//! Allergen mapping: the static trigger-phrase lexicon and the classifier
//! that applies it to free text.

pub mod classifier;
pub mod lexicon;

pub use classifier::{classify, serialize};
pub use lexicon::Lexicon;
