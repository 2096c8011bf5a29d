//! Folding freshly extracted state into the persisted document.

pub mod dedup;
pub mod merge;

pub use dedup::{dedupe_records, dedupe_strings};
pub use merge::merge;
