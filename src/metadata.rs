//! Embedded tag metadata: extraction, background loading and display text.
//!
//! `extract` turns an audio source into an immutable `TrackMetadata`.
//! `MetadataLoader` runs that on a worker thread per source change and
//! guards against out-of-order completions. `TrackDisplay` resolves the
//! optional fields into what the player view shows.

mod display;
mod extract;
mod loader;
mod model;

pub use display::*;
pub use extract::{MetadataError, extract, extract_from_bytes};
pub use loader::*;
pub use model::*;

#[cfg(test)]
mod tests;
