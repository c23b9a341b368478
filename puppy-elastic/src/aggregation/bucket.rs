//! Bucket aggregations

use super::{emit_aggs, Aggregation, Script};
use crate::json::{Emit, JsonWriter};
use crate::query::Query;
use crate::units::{DistanceType, GeoPoint, SortOrder};
use serde_json::Value;

/// Bucket ordering, e.g. `{"_count": "desc"}` or by a sub-aggregation name
#[derive(Debug, Clone, PartialEq)]
pub struct TermsOrder {
    key: String,
    order: SortOrder,
}

impl TermsOrder {
    pub fn new(key: impl Into<String>, order: SortOrder) -> Self {
        Self {
            key: key.into(),
            order,
        }
    }

    pub fn count(order: SortOrder) -> Self {
        Self::new("_count", order)
    }

    pub fn key(order: SortOrder) -> Self {
        Self::new("_key", order)
    }

    fn emit_field(&self, w: &mut JsonWriter) {
        w.object("order", |o| o.field(&self.key, self.order));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermsAgg {
    field: String,
    size: Option<u32>,
    shard_size: Option<u32>,
    min_doc_count: Option<u64>,
    order: Option<TermsOrder>,
    include: Option<String>,
    exclude: Option<String>,
    missing: Option<Value>,
}

impl TermsAgg {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            size: None,
            shard_size: None,
            min_doc_count: None,
            order: None,
            include: None,
            exclude: None,
            missing: None,
        }
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn shard_size(mut self, size: u32) -> Self {
        self.shard_size = Some(size);
        self
    }

    pub fn min_doc_count(mut self, count: u64) -> Self {
        self.min_doc_count = Some(count);
        self
    }

    pub fn order(mut self, order: TermsOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Regex of terms to keep
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include = Some(pattern.into());
        self
    }

    /// Regex of terms to drop
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude = Some(pattern.into());
        self
    }

    pub fn missing(mut self, value: impl Into<Value>) -> Self {
        self.missing = Some(value.into());
        self
    }

    fn emit_body(&self, w: &mut JsonWriter) {
        w.field("field", self.field.as_str());
        w.field_opt("size", &self.size);
        w.field_opt("shard_size", &self.shard_size);
        w.field_opt("min_doc_count", &self.min_doc_count);
        if let Some(order) = &self.order {
            order.emit_field(w);
        }
        w.field_opt("include", &self.include);
        w.field_opt("exclude", &self.exclude);
        w.field_opt("missing", &self.missing);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignificantTermsAgg {
    field: String,
    size: Option<u32>,
    shard_size: Option<u32>,
    min_doc_count: Option<u64>,
    background_filter: Option<Box<Query>>,
}

impl SignificantTermsAgg {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            size: None,
            shard_size: None,
            min_doc_count: None,
            background_filter: None,
        }
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn shard_size(mut self, size: u32) -> Self {
        self.shard_size = Some(size);
        self
    }

    pub fn min_doc_count(mut self, count: u64) -> Self {
        self.min_doc_count = Some(count);
        self
    }

    pub fn background_filter(mut self, filter: impl Into<Query>) -> Self {
        self.background_filter = Some(Box::new(filter.into()));
        self
    }

    fn emit_body(&self, w: &mut JsonWriter) {
        w.field("field", self.field.as_str());
        w.field_opt("size", &self.size);
        w.field_opt("shard_size", &self.shard_size);
        w.field_opt("min_doc_count", &self.min_doc_count);
        if let Some(filter) = &self.background_filter {
            w.emit_in("background_filter", filter.as_ref());
        }
    }
}

/// Forces buckets to exist between `min` and `max` even when empty
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedBounds {
    min: Value,
    max: Value,
}

impl ExtendedBounds {
    pub fn new(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    fn emit_field(&self, w: &mut JsonWriter) {
        w.object("extended_bounds", |b| {
            b.field("min", self.min.clone());
            b.field("max", self.max.clone());
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramAgg {
    field: String,
    interval: f64,
    min_doc_count: Option<u64>,
    keyed: Option<bool>,
    extended_bounds: Option<ExtendedBounds>,
    order: Option<TermsOrder>,
}

impl HistogramAgg {
    pub fn new(field: impl Into<String>, interval: f64) -> Self {
        Self {
            field: field.into(),
            interval,
            min_doc_count: None,
            keyed: None,
            extended_bounds: None,
            order: None,
        }
    }

    pub fn min_doc_count(mut self, count: u64) -> Self {
        self.min_doc_count = Some(count);
        self
    }

    /// Return buckets as an object keyed by bucket key
    pub fn keyed(mut self, keyed: bool) -> Self {
        self.keyed = Some(keyed);
        self
    }

    pub fn extended_bounds(mut self, bounds: ExtendedBounds) -> Self {
        self.extended_bounds = Some(bounds);
        self
    }

    pub fn order(mut self, order: TermsOrder) -> Self {
        self.order = Some(order);
        self
    }

    fn emit_body(&self, w: &mut JsonWriter) {
        w.field("field", self.field.as_str());
        w.field("interval", self.interval);
        w.field_opt("min_doc_count", &self.min_doc_count);
        w.field_opt("keyed", &self.keyed);
        if let Some(bounds) = &self.extended_bounds {
            bounds.emit_field(w);
        }
        if let Some(order) = &self.order {
            order.emit_field(w);
        }
    }
}

/// Histogram over dates. `interval` is a calendar name (`"month"`) or a
/// [`TimeUnit`](crate::units::TimeUnit).
#[derive(Debug, Clone, PartialEq)]
pub struct DateHistogramAgg {
    field: String,
    interval: Value,
    format: Option<String>,
    offset: Option<String>,
    pre_zone_adjust_large_interval: Option<bool>,
    time_zone: Option<String>,
    min_doc_count: Option<u64>,
    extended_bounds: Option<ExtendedBounds>,
    script: Option<Script>,
}

impl DateHistogramAgg {
    pub fn new(field: impl Into<String>, interval: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            interval: interval.into(),
            format: None,
            offset: None,
            pre_zone_adjust_large_interval: None,
            time_zone: None,
            min_doc_count: None,
            extended_bounds: None,
            script: None,
        }
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn offset(mut self, offset: impl Into<String>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn pre_zone_adjust_large_interval(mut self, on: bool) -> Self {
        self.pre_zone_adjust_large_interval = Some(on);
        self
    }

    pub fn time_zone(mut self, tz: impl Into<String>) -> Self {
        self.time_zone = Some(tz.into());
        self
    }

    pub fn min_doc_count(mut self, count: u64) -> Self {
        self.min_doc_count = Some(count);
        self
    }

    pub fn extended_bounds(mut self, bounds: ExtendedBounds) -> Self {
        self.extended_bounds = Some(bounds);
        self
    }

    pub fn script(mut self, script: Script) -> Self {
        self.script = Some(script);
        self
    }

    fn emit_body(&self, w: &mut JsonWriter) {
        w.field("field", self.field.as_str());
        w.field("interval", self.interval.clone());
        w.field_opt("format", &self.format);
        w.field_opt("offset", &self.offset);
        w.field_opt(
            "pre_zone_adjust_large_interval",
            &self.pre_zone_adjust_large_interval,
        );
        w.field_opt("time_zone", &self.time_zone);
        w.field_opt("min_doc_count", &self.min_doc_count);
        if let Some(bounds) = &self.extended_bounds {
            bounds.emit_field(w);
        }
        if let Some(script) = &self.script {
            script.emit_fields(w);
        }
    }
}

/// One range of a range-style aggregation. Either bound may be open.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeEntry {
    key: Option<String>,
    from: Option<Value>,
    to: Option<Value>,
}

impl RangeEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn from(mut self, from: impl Into<Value>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn to(mut self, to: impl Into<Value>) -> Self {
        self.to = Some(to.into());
        self
    }
}

fn emit_ranges(w: &mut JsonWriter, ranges: &[RangeEntry]) {
    w.array("ranges", |a| {
        for range in ranges {
            a.object(|r| {
                r.field_opt("key", &range.key);
                r.field_opt("from", &range.from);
                r.field_opt("to", &range.to);
            });
        }
    });
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeAgg {
    field: String,
    ranges: Vec<RangeEntry>,
    keyed: Option<bool>,
    script: Option<Script>,
}

impl RangeAgg {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ranges: Vec::new(),
            keyed: None,
            script: None,
        }
    }

    pub fn range(mut self, range: RangeEntry) -> Self {
        self.ranges.push(range);
        self
    }

    pub fn keyed(mut self, keyed: bool) -> Self {
        self.keyed = Some(keyed);
        self
    }

    pub fn script(mut self, script: Script) -> Self {
        self.script = Some(script);
        self
    }

    fn emit_body(&self, w: &mut JsonWriter) {
        w.field("field", self.field.as_str());
        emit_ranges(w, &self.ranges);
        w.field_opt("keyed", &self.keyed);
        if let Some(script) = &self.script {
            script.emit_fields(w);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateRangeAgg {
    field: String,
    format: Option<String>,
    ranges: Vec<RangeEntry>,
    keyed: Option<bool>,
    script: Option<Script>,
}

impl DateRangeAgg {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            format: None,
            ranges: Vec::new(),
            keyed: None,
            script: None,
        }
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn range(mut self, range: RangeEntry) -> Self {
        self.ranges.push(range);
        self
    }

    pub fn keyed(mut self, keyed: bool) -> Self {
        self.keyed = Some(keyed);
        self
    }

    pub fn script(mut self, script: Script) -> Self {
        self.script = Some(script);
        self
    }

    fn emit_body(&self, w: &mut JsonWriter) {
        w.field("field", self.field.as_str());
        w.field_opt("format", &self.format);
        emit_ranges(w, &self.ranges);
        w.field_opt("keyed", &self.keyed);
        if let Some(script) = &self.script {
            script.emit_fields(w);
        }
    }
}

/// Distance rings around an origin point
#[derive(Debug, Clone, PartialEq)]
pub struct GeoDistanceAgg {
    field: String,
    origin: GeoPoint,
    unit: Option<String>,
    distance_type: Option<DistanceType>,
    ranges: Vec<RangeEntry>,
    keyed: Option<bool>,
}

impl GeoDistanceAgg {
    pub fn new(field: impl Into<String>, origin: GeoPoint) -> Self {
        Self {
            field: field.into(),
            origin,
            unit: None,
            distance_type: None,
            ranges: Vec::new(),
            keyed: None,
        }
    }

    /// Unit suffix for the range bounds, e.g. `"km"`
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn distance_type(mut self, t: DistanceType) -> Self {
        self.distance_type = Some(t);
        self
    }

    pub fn range(mut self, range: RangeEntry) -> Self {
        self.ranges.push(range);
        self
    }

    pub fn keyed(mut self, keyed: bool) -> Self {
        self.keyed = Some(keyed);
        self
    }

    fn emit_body(&self, w: &mut JsonWriter) {
        w.field("field", self.field.as_str());
        w.field("origin", self.origin);
        w.field_opt("unit", &self.unit);
        w.field_opt("distance_type", &self.distance_type);
        emit_ranges(w, &self.ranges);
        w.field_opt("keyed", &self.keyed);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NestedAgg {
    path: String,
}

impl NestedAgg {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Joins back from nested documents to the parent (or to `path`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReverseNestedAgg {
    path: Option<String>,
}

impl ReverseNestedAgg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// One bucket per named filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiltersAgg {
    filters: Vec<(String, Query)>,
}

impl FiltersAgg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, name: impl Into<String>, filter: impl Into<Query>) -> Self {
        self.filters.push((name.into(), filter.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissingAgg {
    field: String,
}

impl MissingAgg {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

/// Bucket kinds
#[derive(Debug, Clone, PartialEq)]
pub enum Bucket {
    Terms(TermsAgg),
    SignificantTerms(SignificantTermsAgg),
    Histogram(HistogramAgg),
    DateHistogram(DateHistogramAgg),
    Range(RangeAgg),
    DateRange(DateRangeAgg),
    GeoDistance(GeoDistanceAgg),
    Nested(NestedAgg),
    ReverseNested(ReverseNestedAgg),
    Filter(Query),
    Filters(FiltersAgg),
    Global,
    Missing(MissingAgg),
}

impl Bucket {
    fn type_name(&self) -> &'static str {
        match self {
            Bucket::Terms(_) => "terms",
            Bucket::SignificantTerms(_) => "significant_terms",
            Bucket::Histogram(_) => "histogram",
            Bucket::DateHistogram(_) => "date_histogram",
            Bucket::Range(_) => "range",
            Bucket::DateRange(_) => "date_range",
            Bucket::GeoDistance(_) => "geo_distance",
            Bucket::Nested(_) => "nested",
            Bucket::ReverseNested(_) => "reverse_nested",
            Bucket::Filter(_) => "filter",
            Bucket::Filters(_) => "filters",
            Bucket::Global => "global",
            Bucket::Missing(_) => "missing",
        }
    }

    fn emit_body(&self, w: &mut JsonWriter) {
        match self {
            Bucket::Terms(t) => t.emit_body(w),
            Bucket::SignificantTerms(s) => s.emit_body(w),
            Bucket::Histogram(h) => h.emit_body(w),
            Bucket::DateHistogram(d) => d.emit_body(w),
            Bucket::Range(r) => r.emit_body(w),
            Bucket::DateRange(r) => r.emit_body(w),
            Bucket::GeoDistance(g) => g.emit_body(w),
            Bucket::Nested(n) => w.field("path", n.path.as_str()),
            Bucket::ReverseNested(r) => w.field_opt("path", &r.path),
            Bucket::Filter(q) => w.emit(q),
            Bucket::Filters(f) => w.object("filters", |fs| {
                for (name, filter) in &f.filters {
                    fs.emit_in(name, filter);
                }
            }),
            Bucket::Global => {}
            Bucket::Missing(m) => w.field("field", m.field.as_str()),
        }
    }
}

macro_rules! impl_into_bucket {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Bucket {
                fn from(b: $ty) -> Self {
                    Bucket::$variant(b)
                }
            }
        )*
    };
}

impl_into_bucket! {
    TermsAgg => Terms,
    SignificantTermsAgg => SignificantTerms,
    HistogramAgg => Histogram,
    DateHistogramAgg => DateHistogram,
    RangeAgg => Range,
    DateRangeAgg => DateRange,
    GeoDistanceAgg => GeoDistance,
    NestedAgg => Nested,
    ReverseNestedAgg => ReverseNested,
    FiltersAgg => Filters,
    MissingAgg => Missing,
}

/// A named bucket aggregation with its sub-aggregations
#[derive(Debug, Clone, PartialEq)]
pub struct BucketAggregation {
    name: String,
    bucket: Bucket,
    aggs: Vec<Aggregation>,
}

impl BucketAggregation {
    pub fn new(name: impl Into<String>, bucket: impl Into<Bucket>) -> Self {
        Self {
            name: name.into(),
            bucket: bucket.into(),
            aggs: Vec::new(),
        }
    }

    /// Single bucket of documents matching `filter`
    pub fn filter(name: impl Into<String>, filter: impl Into<Query>) -> Self {
        Self::new(name, Bucket::Filter(filter.into()))
    }

    /// Single bucket of all documents, ignoring the search query
    pub fn global(name: impl Into<String>) -> Self {
        Self::new(name, Bucket::Global)
    }

    pub fn sub_aggregation(mut self, agg: impl Into<Aggregation>) -> Self {
        self.aggs.push(agg.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    pub fn sub_aggregations(&self) -> &[Aggregation] {
        &self.aggs
    }
}

impl Emit for BucketAggregation {
    fn emit(&self, w: &mut JsonWriter) {
        w.object(&self.name, |a| {
            a.object(self.bucket.type_name(), |b| self.bucket.emit_body(b));
            emit_aggs(a, &self.aggs);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::MetricAggregation;
    use crate::units::TimeUnit;
    use serde_json::json;

    #[test]
    fn test_terms_order_and_filters() {
        let agg = BucketAggregation::new(
            "tags",
            TermsAgg::new("tag")
                .min_doc_count(0)
                .order(TermsOrder::count(SortOrder::Desc))
                .exclude("spam.*"),
        );
        assert_eq!(
            agg.to_json_value(),
            json!({
                "tags": {
                    "terms": {
                        "field": "tag",
                        "min_doc_count": 0,
                        "order": {"_count": "desc"},
                        "exclude": "spam.*"
                    }
                }
            })
        );
    }

    #[test]
    fn test_date_histogram_with_bounds() {
        let agg = BucketAggregation::new(
            "per_month",
            DateHistogramAgg::new("created", TimeUnit::Months(1))
                .format("yyyy-MM")
                .time_zone("+01:00")
                .extended_bounds(ExtendedBounds::new("2015-01", "2015-12")),
        );
        assert_eq!(
            agg.to_json_value(),
            json!({
                "per_month": {
                    "date_histogram": {
                        "field": "created",
                        "interval": "1M",
                        "format": "yyyy-MM",
                        "time_zone": "+01:00",
                        "extended_bounds": {"min": "2015-01", "max": "2015-12"}
                    }
                }
            })
        );
    }

    #[test]
    fn test_range_open_bounds() {
        let agg = BucketAggregation::new(
            "price_ranges",
            RangeAgg::new("price")
                .range(RangeEntry::new().to(50))
                .range(RangeEntry::new().from(50).to(100))
                .range(RangeEntry::new().key("expensive").from(100))
                .keyed(true),
        );
        assert_eq!(
            agg.to_json_value(),
            json!({
                "price_ranges": {
                    "range": {
                        "field": "price",
                        "ranges": [
                            {"to": 50},
                            {"from": 50, "to": 100},
                            {"key": "expensive", "from": 100}
                        ],
                        "keyed": true
                    }
                }
            })
        );
    }

    #[test]
    fn test_single_bucket_kinds() {
        assert_eq!(
            BucketAggregation::global("all").to_json(),
            r#"{"all":{"global":{}}}"#
        );
        assert_eq!(
            BucketAggregation::new("back", ReverseNestedAgg::new()).to_json(),
            r#"{"back":{"reverse_nested":{}}}"#
        );
        assert_eq!(
            BucketAggregation::new("no_tag", MissingAgg::new("tag")).to_json(),
            r#"{"no_tag":{"missing":{"field":"tag"}}}"#
        );
        assert_eq!(
            BucketAggregation::filter("red", Query::term("color", "red")).to_json(),
            r#"{"red":{"filter":{"term":{"color":"red"}}}}"#
        );
    }

    #[test]
    fn test_filters_and_geo_distance() {
        let agg = BucketAggregation::new(
            "msgs",
            FiltersAgg::new()
                .filter("errors", Query::term("level", "error"))
                .filter("warnings", Query::term("level", "warn")),
        );
        assert_eq!(
            agg.to_json_value(),
            json!({
                "msgs": {
                    "filters": {
                        "filters": {
                            "errors": {"term": {"level": "error"}},
                            "warnings": {"term": {"level": "warn"}}
                        }
                    }
                }
            })
        );

        let rings = BucketAggregation::new(
            "rings",
            GeoDistanceAgg::new("location", GeoPoint::new(52.37, 4.89))
                .unit("km")
                .range(RangeEntry::new().to(100)),
        );
        assert_eq!(
            rings.to_json_value()["rings"]["geo_distance"],
            json!({
                "field": "location",
                "origin": {"lat": 52.37, "lon": 4.89},
                "unit": "km",
                "ranges": [{"to": 100}]
            })
        );
    }

    #[test]
    fn test_significant_terms_background_filter() {
        let agg = BucketAggregation::new(
            "sig",
            SignificantTermsAgg::new("crime_type").background_filter(Query::term("city", "oslo")),
        )
        .sub_aggregation(MetricAggregation::avg("a", "b"));
        let value = agg.to_json_value();
        assert_eq!(
            value["sig"]["significant_terms"]["background_filter"],
            json!({"term": {"city": "oslo"}})
        );
        assert!(value["sig"]["aggs"]["a"].is_object());
    }
}
