//! Band renaming: prefixing band names with their dataset's name so bands
//! from different datasets survive the merge without colliding.

use crate::raster::{Band, RasterSlice};

/// Rewrites every band name to `<dataset>_<band>`, preserving band order,
/// pixel data, and the slice's date and transform.
pub fn rename_with_prefix(slice: RasterSlice, dataset_name: &str) -> RasterSlice {
    let bands = slice
        .bands
        .into_iter()
        .map(|band| Band {
            name: format!("{dataset_name}_{}", band.name),
            grid: band.grid,
        })
        .collect();

    RasterSlice { bands, ..slice }
}
