//! Areas of interest: named polygon features the rasters are reduced over.

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// A protected-area polygon with its unique display name.
#[derive(Debug, Clone)]
pub struct AreaOfInterest {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// Attribute-equality predicate applied when loading features
/// (e.g. `Loc_Ds == "National Park"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFilter {
    pub attribute: String,
    pub value: String,
}
