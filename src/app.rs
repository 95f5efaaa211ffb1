//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds panel selections,
//! the active queue and everything else the UI needs besides the
//! engine's own playback state.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
