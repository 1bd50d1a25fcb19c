//! Materialized multi-band raster slices.
//!
//! A [`RasterSlice`] is one time-stamped raster belonging to a dataset: a grid
//! transform plus an ordered list of named bands. Pixel values are dense
//! row-major `Option<f64>` cells, `None` meaning masked/nodata.

use anyhow::{Result, bail};
use chrono::NaiveDate;

/// Affine mapping from world coordinates to grid cells.
///
/// North-up, no shear: `origin` is the world position of the grid's
/// upper-left corner, rows grow southward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    /// Cell width in world units, positive.
    pub pixel_width: f64,
    /// Cell height in world units, positive.
    pub pixel_height: f64,
}

impl GridTransform {
    /// Returns the (row, col) of the cell containing the world point, or
    /// `None` when the point falls outside an `rows` x `cols` grid.
    pub fn cell_at(&self, x: f64, y: f64, rows: usize, cols: usize) -> Option<(usize, usize)> {
        let col = (x - self.origin_x) / self.pixel_width;
        let row = (self.origin_y - y) / self.pixel_height;
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= rows || col >= cols {
            return None;
        }
        Some((row, col))
    }
}

/// Dense row-major pixel grid for a single band. `None` cells are masked.
#[derive(Debug, Clone, PartialEq)]
pub struct BandGrid {
    rows: usize,
    cols: usize,
    values: Vec<Option<f64>>,
}

impl BandGrid {
    pub fn new(rows: usize, cols: usize, values: Vec<Option<f64>>) -> Result<Self> {
        if values.len() != rows * cols {
            bail!(
                "grid of {}x{} cells needs {} values, got {}",
                rows,
                cols,
                rows * cols,
                values.len()
            );
        }
        Ok(Self { rows, cols, values })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell value, `None` when masked or out of bounds.
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.values[row * self.cols + col]
    }
}

/// A named scalar layer within a slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub name: String,
    pub grid: BandGrid,
}

/// One time-stamped multi-band raster. Band order is significant and is
/// preserved through renaming.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSlice {
    pub date: NaiveDate,
    pub transform: GridTransform,
    pub bands: Vec<Band>,
}

impl RasterSlice {
    pub fn band_names(&self) -> Vec<&str> {
        self.bands.iter().map(|b| b.name.as_str()).collect()
    }
}
