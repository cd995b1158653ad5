use core::ops::{Add, Mul, Sub};

/// Represents a cell address in grid coordinates.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPoint {
    /// The column index, along world x.
    pub column: usize,
    /// The row index, along world z.
    pub row: usize,
}

impl GridPoint {
    /// Creates a new `GridPoint`.
    #[must_use]
    pub const fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

impl core::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Represents a point in world coordinates. `y` is up.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPoint {
    /// The x-coordinate.
    pub x: f32,
    /// The y-coordinate (up).
    pub y: f32,
    /// The z-coordinate.
    pub z: f32,
}

impl WorldPoint {
    /// Creates a new `WorldPoint`.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length when treated as a vector.
    #[must_use]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl Add for WorldPoint {
    type Output = WorldPoint;

    fn add(self, rhs: WorldPoint) -> WorldPoint {
        WorldPoint::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for WorldPoint {
    type Output = WorldPoint;

    fn sub(self, rhs: WorldPoint) -> WorldPoint {
        WorldPoint::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for WorldPoint {
    type Output = WorldPoint;

    fn mul(self, rhs: f32) -> WorldPoint {
        WorldPoint::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}
