//! This module defines the error types used by the `tilewalk-grid` crate.

#![warn(missing_docs)]

/// Error type for grid operations.
///
/// This enum encapsulates all possible errors that can occur when building or
/// addressing a grid.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Error for invalid cell size.
    /// This variant is returned when a cell size is provided that is not positive and finite.
    InvalidCellSize(&'static str),
    /// Error for invalid grid dimensions.
    /// This variant is returned when grid width or height is zero or too large.
    InvalidDimensions(&'static str),
    /// Error for out-of-bounds access.
    /// This variant is returned when addressing a cell outside the grid.
    OutOfBounds {
        /// Requested column.
        column: usize,
        /// Requested row.
        row: usize,
    },
}

impl core::fmt::Display for GridError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GridError::InvalidCellSize(msg) => write!(f, "Invalid cell size: {}", msg),
            GridError::InvalidDimensions(msg) => write!(f, "Invalid grid dimensions: {}", msg),
            GridError::OutOfBounds { column, row } => {
                write!(f, "Grid access out of bounds: ({}, {})", column, row)
            }
        }
    }
}

impl core::error::Error for GridError {}
