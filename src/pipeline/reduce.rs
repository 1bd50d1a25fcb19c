//! Area reduction: per-band spatial means of a slice within each area.
//!
//! Sampling happens on a regular grid at the evaluation scale; a sample
//! contributes when its center falls inside the area's geometry and the
//! underlying cell is not masked. Unweighted means, no partial-pixel
//! weighting at polygon boundaries.

use geo::{BoundingRect, Contains, MultiPolygon, Point};
use std::collections::BTreeMap;

use super::types::ReductionRecord;
use super::utility::mean;
use crate::aoi::AreaOfInterest;
use crate::raster::{BandGrid, GridTransform, RasterSlice};

/// Reduces one renamed slice over every area: one record per (slice, area)
/// pair. A band with no contributing samples is absent from its record.
pub fn reduce_slice(
    slice: &RasterSlice,
    areas: &[AreaOfInterest],
    scale: f64,
) -> Vec<ReductionRecord> {
    areas
        .iter()
        .map(|area| reduce_over_area(slice, area, scale))
        .collect()
}

fn reduce_over_area(slice: &RasterSlice, area: &AreaOfInterest, scale: f64) -> ReductionRecord {
    let mut bands = BTreeMap::new();
    for band in &slice.bands {
        if let Some(value) = mean_within(&band.grid, &slice.transform, &area.geometry, scale) {
            bands.insert(band.name.clone(), value);
        }
    }

    ReductionRecord {
        area: area.name.clone(),
        date: slice.date,
        bands,
    }
}

/// Mean of the band's non-masked values sampled at `scale` across the
/// geometry's bounding box, keeping sample centers the geometry contains.
fn mean_within(
    grid: &BandGrid,
    transform: &GridTransform,
    geometry: &MultiPolygon<f64>,
    scale: f64,
) -> Option<f64> {
    let bounds = geometry.bounding_rect()?;
    let steps_x = ((bounds.width() / scale).ceil() as usize).max(1);
    let steps_y = ((bounds.height() / scale).ceil() as usize).max(1);

    let mut samples = Vec::new();
    for iy in 0..steps_y {
        let y = bounds.min().y + (iy as f64 + 0.5) * scale;
        for ix in 0..steps_x {
            let x = bounds.min().x + (ix as f64 + 0.5) * scale;
            if !geometry.contains(&Point::new(x, y)) {
                continue;
            }
            if let Some(value) = sample(grid, transform, x, y) {
                samples.push(value);
            }
        }
    }

    mean(&samples)
}

fn sample(grid: &BandGrid, transform: &GridTransform, x: f64, y: f64) -> Option<f64> {
    let (row, col) = transform.cell_at(x, y, grid.rows(), grid.cols())?;
    grid.value(row, col)
}
