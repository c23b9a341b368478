use crate::json::{Emit, JsonWriter};
use crate::units::{DistanceType, DistanceUnit, GeoPoint};
use serde_json::Value;

/// Bounding-box pre-check for geo distance filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizeBbox {
    Memory,
    Indexed,
    None,
}

impl From<OptimizeBbox> for Value {
    fn from(o: OptimizeBbox) -> Self {
        Value::from(match o {
            OptimizeBbox::Memory => "memory",
            OptimizeBbox::Indexed => "indexed",
            OptimizeBbox::None => "none",
        })
    }
}

/// Matches documents within `distance` of a point
#[derive(Debug, Clone, PartialEq)]
pub struct GeoDistanceQuery {
    field: String,
    location: GeoPoint,
    distance: DistanceUnit,
    distance_type: Option<DistanceType>,
    optimize_bbox: Option<OptimizeBbox>,
}

impl GeoDistanceQuery {
    pub fn new(field: impl Into<String>, location: GeoPoint, distance: DistanceUnit) -> Self {
        Self {
            field: field.into(),
            location,
            distance,
            distance_type: None,
            optimize_bbox: None,
        }
    }

    pub fn distance_type(mut self, t: DistanceType) -> Self {
        self.distance_type = Some(t);
        self
    }

    pub fn optimize_bbox(mut self, o: OptimizeBbox) -> Self {
        self.optimize_bbox = Some(o);
        self
    }
}

impl Emit for GeoDistanceQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("geo_distance", |g| {
            g.field(&self.field, self.location);
            g.field("distance", self.distance);
            g.field_opt("distance_type", &self.distance_type);
            g.field_opt("optimize_bbox", &self.optimize_bbox);
        });
    }
}
