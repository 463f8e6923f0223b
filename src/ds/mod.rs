//! Data structures backing the cache engine.

pub mod frequency_index;

pub use frequency_index::FrequencyIndex;
