//! Floor grid model and ray picking for the tilewalk demo.
//!
//! A [`Grid`] is a fixed rectangle of square tiles centered on the world
//! origin. [`Grid::pick`] answers which tiles a camera ray passes through.

pub mod error;
pub mod map;
pub mod pick;

pub use error::GridError;
pub use map::{Grid, GridCell, GridPoint, WorldPoint};
pub use pick::{PickHit, Ray};
