//! The dataset catalog: which raster collections feed the pipeline, which
//! bands each contributes, and how their slice sequences are combined.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named raster collection with its selected bands and nominal resolution.
///
/// Immutable once declared. The date range is supplied by the pipeline
/// configuration and applied uniformly to every dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Identifier used to prefix this dataset's band names after merging.
    pub name: String,
    /// Path or URL of the collection document this spec reads from.
    pub collection: String,
    /// Bands to select, in output order. No duplicates.
    pub bands: Vec<String>,
    /// Nominal resolution in meters per pixel.
    pub scale: f64,
}

impl DatasetSpec {
    /// Band names as they appear after prefixing, in selection order.
    pub fn renamed_bands(&self) -> Vec<String> {
        self.bands
            .iter()
            .map(|band| format!("{}_{}", self.name, band))
            .collect()
    }
}

/// Rejects catalogs that would produce ambiguous output columns: empty or
/// duplicate dataset names, empty or duplicate band selections, and band
/// names that still collide after prefixing.
pub fn validate(specs: &[DatasetSpec]) -> Result<()> {
    let mut dataset_names = HashSet::new();
    let mut renamed = HashSet::new();

    for spec in specs {
        if spec.name.trim().is_empty() {
            bail!(
                "dataset reading {} has an empty name",
                spec.collection
            );
        }
        if !dataset_names.insert(spec.name.as_str()) {
            bail!("duplicate dataset name: {}", spec.name);
        }
        if spec.bands.is_empty() {
            bail!("dataset {} selects no bands", spec.name);
        }

        let mut seen = HashSet::new();
        for band in &spec.bands {
            if !seen.insert(band.as_str()) {
                bail!("dataset {} selects band {} more than once", spec.name, band);
            }
        }

        for name in spec.renamed_bands() {
            if !renamed.insert(name.clone()) {
                bail!("renamed band {} collides with another catalog entry", name);
            }
        }
    }

    Ok(())
}

/// Output column order for the exported table: every dataset's renamed bands,
/// in catalog declaration order.
pub fn band_columns(specs: &[DatasetSpec]) -> Vec<String> {
    specs.iter().flat_map(DatasetSpec::renamed_bands).collect()
}

/// Concatenates per-dataset slice sequences into one unified sequence:
/// relative order within each dataset is preserved, datasets follow catalog
/// declaration order. No cross-dataset dedup and no date alignment here;
/// records only line up by date at the group-merge stage.
pub fn merge_collections<T>(collections: Vec<Vec<T>>) -> Vec<T> {
    collections.into_iter().flatten().collect()
}
