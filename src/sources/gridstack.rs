//! Grid-stack raster source.
//!
//! A collection is a JSON document listing time-stamped grids:
//!
//! ```json
//! {
//!   "collection": "NASA/ORNL/DAYMET_V4",
//!   "slices": [
//!     {
//!       "date": "2020-06-01",
//!       "origin": [0.0, 10.0],
//!       "pixel_size": [1.0, 1.0],
//!       "rows": 10,
//!       "cols": 10,
//!       "bands": { "prcp": [1.5, null, 2.0, ...] }
//!     }
//!   ]
//! }
//! ```
//!
//! Band values are row-major; `null` cells are masked. Documents are loaded
//! from the dataset spec's `collection` reference (path or URL), or preloaded
//! in memory.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use super::{DateRange, RasterSource, load_bytes};
use crate::catalog::DatasetSpec;
use crate::raster::{Band, BandGrid, GridTransform, RasterSlice};

#[derive(Debug, Deserialize)]
struct GridStackDoc {
    slices: Vec<SliceDoc>,
}

#[derive(Debug, Deserialize)]
struct SliceDoc {
    date: NaiveDate,
    origin: [f64; 2],
    pixel_size: [f64; 2],
    rows: usize,
    cols: usize,
    bands: HashMap<String, Vec<Option<f64>>>,
}

impl SliceDoc {
    /// Materializes this slice with `spec`'s bands selected in order.
    fn select(&self, spec: &DatasetSpec) -> Result<RasterSlice> {
        let mut bands = Vec::with_capacity(spec.bands.len());
        for name in &spec.bands {
            let values = self.bands.get(name).ok_or_else(|| {
                anyhow::anyhow!(
                    "collection {} slice {} has no band {name}",
                    spec.collection,
                    self.date
                )
            })?;
            let grid = BandGrid::new(self.rows, self.cols, values.clone())
                .with_context(|| format!("band {name} of slice {}", self.date))?;
            bands.push(Band {
                name: name.clone(),
                grid,
            });
        }

        if self.pixel_size[0] <= 0.0 || self.pixel_size[1] <= 0.0 {
            bail!("slice {} has a non-positive pixel size", self.date);
        }

        Ok(RasterSlice {
            date: self.date,
            transform: GridTransform {
                origin_x: self.origin[0],
                origin_y: self.origin[1],
                pixel_width: self.pixel_size[0],
                pixel_height: self.pixel_size[1],
            },
            bands,
        })
    }
}

/// Raster source reading grid-stack JSON documents.
pub struct GridStackSource {
    preloaded: HashMap<String, GridStackDoc>,
}

impl GridStackSource {
    pub fn new() -> Self {
        Self {
            preloaded: HashMap::new(),
        }
    }

    /// Registers an in-memory document for `collection`, bypassing retrieval.
    pub fn with_document(mut self, collection: &str, bytes: &[u8]) -> Result<Self> {
        let doc: GridStackDoc = serde_json::from_slice(bytes)
            .with_context(|| format!("parsing grid stack {collection}"))?;
        self.preloaded.insert(collection.to_string(), doc);
        Ok(self)
    }

    async fn document(&self, collection: &str) -> Result<GridStackDoc> {
        let bytes = load_bytes(collection)
            .await
            .with_context(|| format!("loading grid stack {collection}"))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing grid stack {collection}"))
    }

    fn materialize(
        doc: &GridStackDoc,
        spec: &DatasetSpec,
        range: DateRange,
    ) -> Result<Vec<RasterSlice>> {
        let mut slices = doc
            .slices
            .iter()
            .filter(|s| range.contains(s.date))
            .map(|s| s.select(spec))
            .collect::<Result<Vec<_>>>()?;
        slices.sort_by_key(|s| s.date);

        debug!(
            dataset = %spec.name,
            total = doc.slices.len(),
            in_range = slices.len(),
            "Grid stack filtered"
        );
        Ok(slices)
    }
}

impl Default for GridStackSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RasterSource for GridStackSource {
    async fn slices(&self, spec: &DatasetSpec, range: DateRange) -> Result<Vec<RasterSlice>> {
        match self.preloaded.get(&spec.collection) {
            Some(doc) => Self::materialize(doc, spec, range),
            None => {
                let doc = self.document(&spec.collection).await?;
                Self::materialize(&doc, spec, range)
            }
        }
    }
}
