//! Mockup module - Placement templates for generated ads.

mod placement;

pub use placement::{AdFormat, PlacementCatalog};
