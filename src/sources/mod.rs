//! Collaborator seams for external data suppliers.
//!
//! The pipeline never talks to a concrete store directly: rasters arrive
//! through [`RasterSource`] and area polygons through [`VectorSource`]. The
//! shipped implementations read JSON documents from a local path or over
//! HTTP; tests substitute their own.

mod geojson;
mod gridstack;

pub use geojson::GeoJsonAreas;
pub use gridstack::GridStackSource;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::aoi::{AreaOfInterest, AttributeFilter};
use crate::catalog::DatasetSpec;
use crate::raster::RasterSlice;

/// Half-open date window `[start, end)` applied to every dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// Supplies, per dataset, a materialized time-ordered sequence of multi-band
/// rasters filtered to the date window and the spec's band selection.
#[async_trait]
pub trait RasterSource: Send + Sync {
    async fn slices(&self, spec: &DatasetSpec, range: DateRange) -> Result<Vec<RasterSlice>>;
}

/// Supplies polygon features matching an attribute-equality filter, each
/// carrying a name attribute and geometry.
#[async_trait]
pub trait VectorSource: Send + Sync {
    async fn areas(&self, filter: &AttributeFilter) -> Result<Vec<AreaOfInterest>>;
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response>;
}

pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self(reqwest::Client::new())
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    Ok(resp.bytes().await?.to_vec())
}

/// Loads a document from a local file path or fetches it over HTTP.
#[tracing::instrument(fields(source = %source))]
pub async fn load_bytes(source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        let client = BasicClient::new();
        fetch_bytes(&client, source).await?
    } else {
        std::fs::read(source)?
    };
    Ok(bytes)
}
