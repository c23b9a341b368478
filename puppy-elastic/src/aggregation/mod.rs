//! Aggregation nodes
//!
//! An aggregation writes itself as `"<name>": { "<type>": {...} }`. Bucket
//! aggregations may own children, written under `"aggs"` next to the type
//! object. The name is also the key under which the engine returns the
//! result.

mod bucket;
mod metric;

pub use bucket::{
    Bucket, BucketAggregation, DateHistogramAgg, DateRangeAgg, ExtendedBounds, FiltersAgg,
    GeoDistanceAgg, HistogramAgg, MissingAgg, NestedAgg, RangeAgg, RangeEntry, ReverseNestedAgg,
    SignificantTermsAgg, TermsAgg, TermsOrder,
};
pub use metric::{CardinalityAgg, FieldAgg, Metric, MetricAggregation, PercentilesAgg};

use crate::json::{Emit, JsonWriter};

/// A named metric or bucket aggregation
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    Metric(MetricAggregation),
    Bucket(BucketAggregation),
}

impl Aggregation {
    pub fn name(&self) -> &str {
        match self {
            Aggregation::Metric(m) => m.name(),
            Aggregation::Bucket(b) => b.name(),
        }
    }
}

impl Emit for Aggregation {
    fn emit(&self, w: &mut JsonWriter) {
        match self {
            Aggregation::Metric(m) => m.emit(w),
            Aggregation::Bucket(b) => b.emit(w),
        }
    }
}

impl From<MetricAggregation> for Aggregation {
    fn from(m: MetricAggregation) -> Self {
        Aggregation::Metric(m)
    }
}

impl From<BucketAggregation> for Aggregation {
    fn from(b: BucketAggregation) -> Self {
        Aggregation::Bucket(b)
    }
}

/// Write a list of aggregations as the properties of an `"aggs"` object.
/// Nothing is written for an empty list.
pub(crate) fn emit_aggs(w: &mut JsonWriter, aggs: &[Aggregation]) {
    if aggs.is_empty() {
        return;
    }
    w.object("aggs", |a| {
        for agg in aggs {
            a.emit(agg);
        }
    });
}

/// Script with optional parameters, written as sibling `script`/`params`
/// properties
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    source: String,
    params: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Script {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            params: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params
            .get_or_insert_with(serde_json::Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub(crate) fn emit_fields(&self, w: &mut JsonWriter) {
        w.field("script", self.source.as_str());
        if let Some(params) = &self.params {
            w.field("params", serde_json::Value::Object(params.clone()));
        }
    }
}
