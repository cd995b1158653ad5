//! Grid layout types.
//!
//! This module provides the tile grid itself and the point types used to
//! address it in grid space (columns and rows) and world space.

pub mod grid;
pub mod point_types;

pub use grid::{Grid, GridCell};
pub use point_types::{GridPoint, WorldPoint};
