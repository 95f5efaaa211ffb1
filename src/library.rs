//! Track catalog: scanning, metadata and grouping.
//!
//! The catalog is built once at startup from a directory scan and stays
//! read-only for the rest of the session. Every other module refers to
//! its tracks through [`TrackId`].

mod display;
mod model;
mod scan;

pub use display::display_from_fields;
pub use model::{Catalog, Track, TrackId};
pub use scan::scan;

#[cfg(test)]
mod tests;
