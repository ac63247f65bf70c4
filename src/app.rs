//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds view state that is not
//! owned by the playback controller: panel visibility, the open prompt and
//! where the progress bar was last drawn.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
