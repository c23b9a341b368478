//! Metric aggregations

use super::Script;
use crate::json::{Emit, JsonWriter};
use serde_json::Value;

/// Field or script source shared by the simple metrics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldAgg {
    field: Option<String>,
    script: Option<Script>,
    missing: Option<Value>,
}

impl FieldAgg {
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            ..Default::default()
        }
    }

    pub fn script(script: Script) -> Self {
        Self {
            script: Some(script),
            ..Default::default()
        }
    }

    /// Value used for documents without the field
    pub fn missing(mut self, value: impl Into<Value>) -> Self {
        self.missing = Some(value.into());
        self
    }

    fn emit_body(&self, w: &mut JsonWriter) {
        w.field_opt("field", &self.field);
        if let Some(script) = &self.script {
            script.emit_fields(w);
        }
        w.field_opt("missing", &self.missing);
    }
}

/// Approximate distinct count
#[derive(Debug, Clone, PartialEq)]
pub struct CardinalityAgg {
    source: FieldAgg,
    precision_threshold: Option<u32>,
    rehash: Option<bool>,
}

impl CardinalityAgg {
    pub fn new(source: FieldAgg) -> Self {
        Self {
            source,
            precision_threshold: None,
            rehash: None,
        }
    }

    pub fn precision_threshold(mut self, threshold: u32) -> Self {
        self.precision_threshold = Some(threshold);
        self
    }

    pub fn rehash(mut self, on: bool) -> Self {
        self.rehash = Some(on);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PercentilesAgg {
    source: FieldAgg,
    percents: Option<Vec<f64>>,
    compression: Option<f64>,
}

impl PercentilesAgg {
    pub fn new(source: FieldAgg) -> Self {
        Self {
            source,
            percents: None,
            compression: None,
        }
    }

    pub fn percents(mut self, percents: impl IntoIterator<Item = f64>) -> Self {
        self.percents = Some(percents.into_iter().collect());
        self
    }

    pub fn compression(mut self, compression: f64) -> Self {
        self.compression = Some(compression);
        self
    }
}

/// Metric kinds
#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    Avg(FieldAgg),
    Sum(FieldAgg),
    Min(FieldAgg),
    Max(FieldAgg),
    Stats(FieldAgg),
    ExtendedStats(FieldAgg),
    ValueCount(FieldAgg),
    Cardinality(CardinalityAgg),
    Percentiles(PercentilesAgg),
}

impl Metric {
    fn type_name(&self) -> &'static str {
        match self {
            Metric::Avg(_) => "avg",
            Metric::Sum(_) => "sum",
            Metric::Min(_) => "min",
            Metric::Max(_) => "max",
            Metric::Stats(_) => "stats",
            Metric::ExtendedStats(_) => "extended_stats",
            Metric::ValueCount(_) => "value_count",
            Metric::Cardinality(_) => "cardinality",
            Metric::Percentiles(_) => "percentiles",
        }
    }

    fn emit_body(&self, w: &mut JsonWriter) {
        match self {
            Metric::Avg(f)
            | Metric::Sum(f)
            | Metric::Min(f)
            | Metric::Max(f)
            | Metric::Stats(f)
            | Metric::ExtendedStats(f)
            | Metric::ValueCount(f) => f.emit_body(w),
            Metric::Cardinality(c) => {
                c.source.emit_body(w);
                w.field_opt("precision_threshold", &c.precision_threshold);
                w.field_opt("rehash", &c.rehash);
            }
            Metric::Percentiles(p) => {
                p.source.emit_body(w);
                w.list_opt("percents", &p.percents);
                w.field_opt("compression", &p.compression);
            }
        }
    }
}

impl From<CardinalityAgg> for Metric {
    fn from(c: CardinalityAgg) -> Self {
        Metric::Cardinality(c)
    }
}

impl From<PercentilesAgg> for Metric {
    fn from(p: PercentilesAgg) -> Self {
        Metric::Percentiles(p)
    }
}

/// A named metric aggregation. Metrics are leaves and never own children.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricAggregation {
    name: String,
    metric: Metric,
}

impl MetricAggregation {
    pub fn new(name: impl Into<String>, metric: impl Into<Metric>) -> Self {
        Self {
            name: name.into(),
            metric: metric.into(),
        }
    }

    pub fn avg(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, Metric::Avg(FieldAgg::field(field)))
    }

    pub fn sum(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, Metric::Sum(FieldAgg::field(field)))
    }

    pub fn min(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, Metric::Min(FieldAgg::field(field)))
    }

    pub fn max(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, Metric::Max(FieldAgg::field(field)))
    }

    pub fn stats(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, Metric::Stats(FieldAgg::field(field)))
    }

    pub fn extended_stats(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, Metric::ExtendedStats(FieldAgg::field(field)))
    }

    pub fn value_count(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, Metric::ValueCount(FieldAgg::field(field)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metric(&self) -> &Metric {
        &self.metric
    }
}

impl Emit for MetricAggregation {
    fn emit(&self, w: &mut JsonWriter) {
        w.object(&self.name, |a| {
            a.object(self.metric.type_name(), |m| self.metric.emit_body(m));
        });
    }
}
