//! The four-stage reshaping pipeline: catalog retrieval, band renaming, area
//! reduction, and group-merge.
//!
//! Retrieval is async; the computation stages are pure functions over fully
//! materialized inputs, so each is independently testable and the whole run
//! is deterministic for fixed inputs.

pub mod merge;
pub mod reduce;
pub mod rename;
pub mod types;
pub mod utility;

use anyhow::Result;
use tracing::{debug, info};

use crate::catalog;
use crate::config::PipelineConfig;
use crate::sources::{RasterSource, VectorSource};
use self::types::MergedRecord;

/// Runs the full pipeline and returns merged rows sorted by (area, date).
///
/// Any collaborator failure aborts the run; there is no partial output.
#[tracing::instrument(skip_all, fields(datasets = config.datasets.len()))]
pub async fn run<R, V>(config: &PipelineConfig, rasters: &R, vectors: &V) -> Result<Vec<MergedRecord>>
where
    R: RasterSource,
    V: VectorSource,
{
    catalog::validate(&config.datasets)?;

    let areas = vectors.areas(&config.areas.filter()).await?;
    info!(area_count = areas.len(), "Areas of interest loaded");

    let range = config.date_range();
    let mut collections = Vec::with_capacity(config.datasets.len());
    for spec in &config.datasets {
        let slices = rasters.slices(spec, range).await?;
        debug!(dataset = %spec.name, slice_count = slices.len(), "Slices fetched");

        let scale = config.scale_for(spec);
        let renamed: Vec<_> = slices
            .into_iter()
            .map(|slice| (rename::rename_with_prefix(slice, &spec.name), scale))
            .collect();
        collections.push(renamed);
    }

    let slices = catalog::merge_collections(collections);
    info!(slice_count = slices.len(), "Merged slice sequence ready");

    let mut records = Vec::new();
    for (slice, scale) in &slices {
        records.extend(reduce::reduce_slice(slice, &areas, *scale));
    }
    info!(record_count = records.len(), "Per-area reduction complete");

    let rows = merge::merge_records(records);
    info!(row_count = rows.len(), "Merged by area and date");
    Ok(rows)
}
