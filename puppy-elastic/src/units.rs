//! Time, distance and geo units as the engine spells them

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Time value such as `1m` or `30s`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Milliseconds(u32),
    Seconds(u32),
    Minutes(u32),
    Hours(u32),
    Days(u32),
    Weeks(u32),
    Months(u32),
    Years(u32),
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUnit::Milliseconds(n) => write!(f, "{}ms", n),
            TimeUnit::Seconds(n) => write!(f, "{}s", n),
            TimeUnit::Minutes(n) => write!(f, "{}m", n),
            TimeUnit::Hours(n) => write!(f, "{}h", n),
            TimeUnit::Days(n) => write!(f, "{}d", n),
            TimeUnit::Weeks(n) => write!(f, "{}w", n),
            TimeUnit::Months(n) => write!(f, "{}M", n),
            TimeUnit::Years(n) => write!(f, "{}y", n),
        }
    }
}

impl TimeUnit {
    /// Parse the engine notation (`500ms`, `1m`, `2M`, ...)
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit())?;
        let (digits, unit) = s.split_at(split);
        let n: u32 = digits.parse().ok()?;
        match unit {
            "ms" => Some(TimeUnit::Milliseconds(n)),
            "s" => Some(TimeUnit::Seconds(n)),
            "m" => Some(TimeUnit::Minutes(n)),
            "h" => Some(TimeUnit::Hours(n)),
            "d" => Some(TimeUnit::Days(n)),
            "w" => Some(TimeUnit::Weeks(n)),
            "M" => Some(TimeUnit::Months(n)),
            "y" => Some(TimeUnit::Years(n)),
            _ => None,
        }
    }
}

impl From<TimeUnit> for Value {
    fn from(unit: TimeUnit) -> Self {
        Value::String(unit.to_string())
    }
}

/// Distance value such as `12km`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceUnit {
    Millimeters(f64),
    Centimeters(f64),
    Meters(f64),
    Kilometers(f64),
    Inches(f64),
    Feet(f64),
    Yards(f64),
    Miles(f64),
    NauticalMiles(f64),
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (value, suffix) = match self {
            DistanceUnit::Millimeters(v) => (v, "mm"),
            DistanceUnit::Centimeters(v) => (v, "cm"),
            DistanceUnit::Meters(v) => (v, "m"),
            DistanceUnit::Kilometers(v) => (v, "km"),
            DistanceUnit::Inches(v) => (v, "in"),
            DistanceUnit::Feet(v) => (v, "ft"),
            DistanceUnit::Yards(v) => (v, "yd"),
            DistanceUnit::Miles(v) => (v, "mi"),
            DistanceUnit::NauticalMiles(v) => (v, "nmi"),
        };
        write!(f, "{}{}", value, suffix)
    }
}

impl From<DistanceUnit> for Value {
    fn from(unit: DistanceUnit) -> Self {
        Value::String(unit.to_string())
    }
}

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<GeoPoint> for Value {
    fn from(point: GeoPoint) -> Self {
        json!({ "lat": point.lat, "lon": point.lon })
    }
}

/// How geo distances are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceType {
    Arc,
    Plane,
    SloppyArc,
}

impl From<DistanceType> for Value {
    fn from(t: DistanceType) -> Self {
        Value::from(match t {
            DistanceType::Arc => "arc",
            DistanceType::Plane => "plane",
            DistanceType::SloppyArc => "sloppy_arc",
        })
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl From<SortOrder> for Value {
    fn from(order: SortOrder) -> Self {
        Value::from(match order {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}
