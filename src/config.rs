//! Pipeline configuration.
//!
//! The whole external configuration surface lives here: date range, dataset
//! catalog, evaluation scale, area source/filter, and export destination.
//! Loadable from a JSON file; [`PipelineConfig::default`] reproduces the
//! catalog the tool originally shipped with.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aoi::AttributeFilter;
use crate::catalog::DatasetSpec;
use crate::sources::DateRange;

/// Where area polygons come from and how they are filtered and named.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaSourceConfig {
    /// Path or URL of a GeoJSON FeatureCollection.
    pub source: String,
    pub filter_attribute: String,
    pub filter_value: String,
    /// Property carrying each feature's unique display name.
    #[serde(default = "default_name_attribute")]
    pub name_attribute: String,
}

impl AreaSourceConfig {
    pub fn filter(&self) -> AttributeFilter {
        AttributeFilter {
            attribute: self.filter_attribute.clone(),
            value: self.filter_value.clone(),
        }
    }
}

fn default_name_attribute() -> String {
    "Unit_Nm".to_string()
}

/// Tabular format the export collaborator writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Csv
}

/// Full configuration of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Inclusive start of the date window applied to every dataset.
    pub start_date: NaiveDate,
    /// Exclusive end of the date window.
    pub end_date: NaiveDate,
    pub datasets: Vec<DatasetSpec>,
    /// Global reduction scale in meters. When set it overrides every
    /// dataset's nominal scale; when absent each dataset reduces at its own.
    #[serde(default)]
    pub evaluation_scale: Option<f64>,
    pub areas: AreaSourceConfig,
    /// Destination name of the export, without extension.
    pub output_name: String,
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config {path}"))?;
        serde_json::from_str(&content).with_context(|| format!("parsing pipeline config {path}"))
    }

    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Reduction scale for one dataset: the global override when configured,
    /// otherwise the dataset's nominal scale.
    pub fn scale_for(&self, spec: &DatasetSpec) -> f64 {
        self.evaluation_scale.unwrap_or(spec.scale)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            datasets: vec![
                DatasetSpec {
                    name: "DAYMET".to_string(),
                    collection: "data/daymet_v4.json".to_string(),
                    bands: ["prcp", "srad", "swe", "tmax", "tmin", "vp"]
                        .iter()
                        .map(|b| b.to_string())
                        .collect(),
                    scale: 1000.0,
                },
                DatasetSpec {
                    name: "ERA5".to_string(),
                    collection: "data/era5_land_daily.json".to_string(),
                    bands: [
                        "temperature_2m",
                        "temperature_2m_min",
                        "temperature_2m_max",
                        "v_component_of_wind_10m",
                        "u_component_of_wind_10m",
                        "snowmelt_sum",
                        "snowfall_sum",
                        "snow_cover",
                        "snow_density",
                        "snow_depth",
                        "leaf_area_index_high_vegetation",
                        "leaf_area_index_low_vegetation",
                        "total_evaporation_sum",
                        "potential_evaporation_sum",
                    ]
                    .iter()
                    .map(|b| b.to_string())
                    .collect(),
                    scale: 11132.0,
                },
            ],
            evaluation_scale: Some(1000.0),
            areas: AreaSourceConfig {
                source: "data/padus_proclamation.geojson".to_string(),
                filter_attribute: "Loc_Ds".to_string(),
                filter_value: "National Park".to_string(),
                name_attribute: default_name_attribute(),
            },
            output_name: "clean_timeseries_export".to_string(),
            output_format: OutputFormat::Csv,
        }
    }
}
