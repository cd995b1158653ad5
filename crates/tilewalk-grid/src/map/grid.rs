#![warn(missing_docs)]

use tracing::debug;

use super::{GridPoint, WorldPoint};
use crate::error::GridError;

/// One floor tile: its address and the world position of its center.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCell {
    point: GridPoint,
    center: WorldPoint,
}

impl GridCell {
    /// Grid address of this cell.
    pub fn point(&self) -> GridPoint {
        self.point
    }

    /// World position of the cell center. The tile's top face is centered
    /// here; `y` is always zero.
    pub fn center(&self) -> WorldPoint {
        self.center
    }
}

/// A fixed rectangle of square tiles centered on the world origin.
///
/// Cell `(i, j)` is centered at
/// `(i*size - (width/2)*size, 0, j*size - (height/2)*size)`, so for even
/// dimensions cell `(width/2, height/2)` sits on the origin. Cells are stored
/// column-major: `index = column * height + row`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    /// Number of columns (along world x)
    width: usize,
    /// Number of rows (along world z)
    height: usize,
    /// Edge length of one square cell in world units
    cell_size: f32,
    /// Cells in column-major order
    cells: Vec<GridCell>,
}

impl Grid {
    /// Creates a new Grid with the specified dimensions and cell size.
    ///
    /// # Arguments
    /// * `width` - Number of columns
    /// * `height` - Number of rows
    /// * `cell_size` - Edge length of each cell in world units
    ///
    /// # Returns
    /// * `Result<Self, GridError>` - The created Grid or an error if parameters are invalid
    pub fn new(width: usize, height: usize, cell_size: f32) -> Result<Self, GridError> {
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(GridError::InvalidCellSize("Cell size must be positive and finite"));
        }
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions("Width and height must be non-zero"));
        }
        let Some(len) = width.checked_mul(height) else {
            return Err(GridError::InvalidDimensions("Grid dimensions too large, would cause overflow"));
        };

        let x0 = -(width as f32 / 2.0) * cell_size;
        let z0 = -(height as f32 / 2.0) * cell_size;

        let mut cells = Vec::with_capacity(len);
        for column in 0..width {
            for row in 0..height {
                cells.push(GridCell {
                    point: GridPoint::new(column, row),
                    center: WorldPoint::new(
                        column as f32 * cell_size + x0,
                        0.0,
                        row as f32 * cell_size + z0,
                    ),
                });
            }
        }

        debug!(width, height, cell_size, cells = cells.len(), "Grid created");

        Ok(Grid {
            width,
            height,
            cell_size,
            cells,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Edge length of one cell.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Total number of cells (`width * height`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; a grid has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in column-major order.
    pub fn cells(&self) -> impl ExactSizeIterator<Item = &GridCell> + '_ {
        self.cells.iter()
    }

    /// Column-major index of `p`, or `None` if outside the grid.
    pub fn index_of(&self, p: GridPoint) -> Option<usize> {
        (p.column < self.width && p.row < self.height).then(|| p.column * self.height + p.row)
    }

    /// Gets the cell at a grid coordinate position.
    ///
    /// # Returns
    /// * `Result<&GridCell, GridError>` - The cell or an error if out of bounds
    pub fn cell(&self, p: GridPoint) -> Result<&GridCell, GridError> {
        self.index_of(p)
            .map(|index| &self.cells[index])
            .ok_or(GridError::OutOfBounds {
                column: p.column,
                row: p.row,
            })
    }

    /// Finds the cell whose footprint contains a world position. Height is
    /// ignored. A point exactly on the far edge of the floor is outside.
    ///
    /// # Returns
    /// * `Option<GridPoint>` - Grid coordinates if on the floor, None otherwise
    pub fn world_to_grid(&self, world_p: WorldPoint) -> Option<GridPoint> {
        let (min, _) = self.world_bounds();
        let column_f = (world_p.x - min.x) / self.cell_size;
        let row_f = (world_p.z - min.z) / self.cell_size;

        if !(column_f >= 0.0 && row_f >= 0.0) || column_f >= self.width as f32 || row_f >= self.height as f32 {
            return None;
        }

        let p = GridPoint::new(column_f.floor() as usize, row_f.floor() as usize);
        self.index_of(p).map(|_| p)
    }

    /// Gets the world-space corners of the floor.
    ///
    /// # Returns
    /// * `(WorldPoint, WorldPoint)` - The minimum and maximum corners (x/z; y is zero)
    pub fn world_bounds(&self) -> (WorldPoint, WorldPoint) {
        let half = self.cell_size / 2.0;
        let min_x = -(self.width as f32 / 2.0) * self.cell_size - half;
        let min_z = -(self.height as f32 / 2.0) * self.cell_size - half;
        let min_p = WorldPoint::new(min_x, 0.0, min_z);
        let max_p = WorldPoint::new(
            min_x + self.width as f32 * self.cell_size,
            0.0,
            min_z + self.height as f32 * self.cell_size,
        );
        (min_p, max_p)
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (min, max) = self.world_bounds();
        write!(
            f,
            "Grid ({}x{}, cell size: {:.2}, x: {:.1}..{:.1}, z: {:.1}..{:.1})",
            self.width, self.height, self.cell_size, min.x, max.x, min.z, max.z
        )
    }
}
