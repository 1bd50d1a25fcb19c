//! Record types flowing between the pipeline stages.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Spatial means of one renamed slice over one area of interest.
///
/// A band with no contributing pixels is absent from `bands`: never zero,
/// never null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReductionRecord {
    pub area: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub bands: BTreeMap<String, f64>,
}

/// One output row: the union of all reduction records sharing (area, date).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub area: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub bands: BTreeMap<String, f64>,
}
