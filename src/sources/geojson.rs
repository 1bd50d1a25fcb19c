//! GeoJSON-backed vector source.
//!
//! Loads a FeatureCollection from a local path or URL and serves the features
//! matching an attribute-equality filter as [`AreaOfInterest`] values. Only
//! polygonal geometry is meaningful here; a matching feature with point or
//! line geometry is an error, as is a missing name attribute.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use geo::{LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{VectorSource, load_bytes};
use crate::aoi::{AreaOfInterest, AttributeFilter};

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
    /// Kept as raw JSON so collections mixing in non-polygon features still
    /// load; geometry is only interpreted for features that pass the filter.
    geometry: Option<Value>,
}

/// Vector source reading a GeoJSON FeatureCollection document.
pub struct GeoJsonAreas {
    name_attribute: String,
    collection: FeatureCollection,
}

impl GeoJsonAreas {
    /// Loads the document from a local path or over HTTP.
    pub async fn open(source: &str, name_attribute: &str) -> Result<Self> {
        let bytes = load_bytes(source)
            .await
            .with_context(|| format!("loading area collection {source}"))?;
        Self::from_slice(&bytes, name_attribute)
    }

    pub fn from_slice(bytes: &[u8], name_attribute: &str) -> Result<Self> {
        let collection: FeatureCollection =
            serde_json::from_slice(bytes).context("parsing GeoJSON feature collection")?;
        Ok(Self {
            name_attribute: name_attribute.to_string(),
            collection,
        })
    }
}

#[async_trait]
impl VectorSource for GeoJsonAreas {
    async fn areas(&self, filter: &AttributeFilter) -> Result<Vec<AreaOfInterest>> {
        let mut out = Vec::new();

        for feature in &self.collection.features {
            let matches = feature
                .properties
                .get(&filter.attribute)
                .and_then(Value::as_str)
                == Some(filter.value.as_str());
            if !matches {
                continue;
            }

            let name = feature
                .properties
                .get(&self.name_attribute)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    anyhow!(
                        "feature matching {}={} has no usable {} attribute",
                        filter.attribute,
                        filter.value,
                        self.name_attribute
                    )
                })?;

            let geometry = feature
                .geometry
                .as_ref()
                .ok_or_else(|| anyhow!("feature {name} has no geometry"))?;
            let geometry = to_multi_polygon(geometry)
                .with_context(|| format!("reading geometry of feature {name}"))?;

            out.push(AreaOfInterest {
                name: name.to_string(),
                geometry,
            });
        }

        debug!(
            matched = out.len(),
            total = self.collection.features.len(),
            "Area filter applied"
        );
        Ok(out)
    }
}

/// GeoJSON positions: `[x, y]` or `[x, y, z]`; extra elements are ignored.
type Position = Vec<f64>;

fn to_multi_polygon(geometry: &Value) -> Result<MultiPolygon<f64>> {
    let kind = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("geometry has no type"))?;
    let coordinates = geometry
        .get("coordinates")
        .ok_or_else(|| anyhow!("geometry has no coordinates"))?;

    match kind {
        "Polygon" => {
            let rings: Vec<Vec<Position>> = serde_json::from_value(coordinates.clone())?;
            Ok(MultiPolygon::new(vec![polygon_from_rings(&rings)?]))
        }
        "MultiPolygon" => {
            let polygons: Vec<Vec<Vec<Position>>> = serde_json::from_value(coordinates.clone())?;
            polygons
                .iter()
                .map(|rings| polygon_from_rings(rings))
                .collect::<Result<Vec<_>>>()
                .map(MultiPolygon::new)
        }
        other => bail!("unsupported geometry type {other}, expected polygonal"),
    }
}

fn polygon_from_rings(rings: &[Vec<Position>]) -> Result<Polygon<f64>> {
    let mut lines = rings.iter().map(|ring| ring_to_line_string(ring));
    let exterior = lines
        .next()
        .ok_or_else(|| anyhow!("polygon has no rings"))??;
    let interiors = lines.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn ring_to_line_string(ring: &[Position]) -> Result<LineString<f64>> {
    let coords = ring
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok((*x, *y)),
            _ => bail!("position with fewer than two coordinates"),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(LineString::from(coords))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARKS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"Unit_Nm": "Park A", "Loc_Ds": "National Park"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"Unit_Nm": "Forest B", "Loc_Ds": "State Forest"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[20.0, 0.0], [30.0, 0.0], [30.0, 10.0], [20.0, 10.0], [20.0, 0.0]]]
                }
            }
        ]
    }"#;

    fn national_parks() -> AttributeFilter {
        AttributeFilter {
            attribute: "Loc_Ds".to_string(),
            value: "National Park".to_string(),
        }
    }

    #[tokio::test]
    async fn test_filter_keeps_only_matching_features() {
        let source = GeoJsonAreas::from_slice(PARKS.as_bytes(), "Unit_Nm").unwrap();
        let areas = source.areas(&national_parks()).await.unwrap();

        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].name, "Park A");
        assert_eq!(areas[0].geometry.0.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_name_attribute_is_an_error() {
        let doc = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"Loc_Ds": "National Park"},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}
            }]
        }"#;
        let source = GeoJsonAreas::from_slice(doc.as_bytes(), "Unit_Nm").unwrap();
        assert!(source.areas(&national_parks()).await.is_err());
    }

    #[tokio::test]
    async fn test_multipolygon_and_elevated_positions() {
        let doc = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"Unit_Nm": "Park M", "Loc_Ds": "National Park"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[0, 0, 5.0], [1, 0, 5.0], [1, 1, 5.0], [0, 0, 5.0]]],
                        [[[2, 2], [3, 2], [3, 3], [2, 2]]]
                    ]
                }
            }]
        }"#;
        let source = GeoJsonAreas::from_slice(doc.as_bytes(), "Unit_Nm").unwrap();
        let areas = source.areas(&national_parks()).await.unwrap();

        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].geometry.0.len(), 2);
    }

    #[tokio::test]
    async fn test_non_polygonal_geometry_is_an_error() {
        let doc = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"Unit_Nm": "Marker", "Loc_Ds": "National Park"},
                "geometry": {"type": "Point", "coordinates": [0, 0]}
            }]
        }"#;
        let source = GeoJsonAreas::from_slice(doc.as_bytes(), "Unit_Nm").unwrap();
        assert!(source.areas(&national_parks()).await.is_err());
    }

    #[tokio::test]
    async fn test_non_matching_features_skip_geometry_checks() {
        // Point geometry on a feature the filter drops must not fail the load.
        let doc = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"Unit_Nm": "Marker", "Loc_Ds": "Visitor Center"},
                "geometry": {"type": "Point", "coordinates": [0, 0]}
            }]
        }"#;
        let source = GeoJsonAreas::from_slice(doc.as_bytes(), "Unit_Nm").unwrap();
        let areas = source.areas(&national_parks()).await.unwrap();
        assert!(areas.is_empty());
    }
}
