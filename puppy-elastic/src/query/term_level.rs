//! Term-level queries: exact values, ranges and patterns

use crate::json::{Emit, JsonWriter};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchAllQuery {
    boost: Option<f64>,
}

impl MatchAllQuery {
    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl Emit for MatchAllQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("match_all", |o| o.field_opt("boost", &self.boost));
    }
}

/// Exact match on a single value. Written in the short form
/// `{"field": value}` unless a boost is set.
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    field: String,
    value: Value,
    boost: Option<f64>,
}

impl TermQuery {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl Emit for TermQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("term", |t| match self.boost {
            None => t.field(&self.field, self.value.clone()),
            Some(_) => t.object(&self.field, |f| {
                f.field("value", self.value.clone());
                f.field_opt("boost", &self.boost);
            }),
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermsQuery {
    field: String,
    values: Vec<Value>,
    boost: Option<f64>,
}

impl TermsQuery {
    pub fn new<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
            boost: None,
        }
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl Emit for TermsQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("terms", |t| {
            t.list(&self.field, &self.values);
            t.field_opt("boost", &self.boost);
        });
    }
}

/// Range over numbers, dates or strings
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    field: String,
    gt: Option<Value>,
    gte: Option<Value>,
    lt: Option<Value>,
    lte: Option<Value>,
    format: Option<String>,
    time_zone: Option<String>,
    boost: Option<f64>,
}

impl RangeQuery {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            gt: None,
            gte: None,
            lt: None,
            lte: None,
            format: None,
            time_zone: None,
            boost: None,
        }
    }

    pub fn gt(mut self, value: impl Into<Value>) -> Self {
        self.gt = Some(value.into());
        self
    }

    pub fn gte(mut self, value: impl Into<Value>) -> Self {
        self.gte = Some(value.into());
        self
    }

    pub fn lt(mut self, value: impl Into<Value>) -> Self {
        self.lt = Some(value.into());
        self
    }

    pub fn lte(mut self, value: impl Into<Value>) -> Self {
        self.lte = Some(value.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn time_zone(mut self, tz: impl Into<String>) -> Self {
        self.time_zone = Some(tz.into());
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl Emit for RangeQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("range", |r| {
            r.object(&self.field, |f| {
                f.field_opt("gt", &self.gt);
                f.field_opt("gte", &self.gte);
                f.field_opt("lt", &self.lt);
                f.field_opt("lte", &self.lte);
                f.field_opt("format", &self.format);
                f.field_opt("time_zone", &self.time_zone);
                f.field_opt("boost", &self.boost);
            })
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExistsQuery {
    field: String,
}

impl ExistsQuery {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Emit for ExistsQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("exists", |e| e.field("field", self.field.as_str()));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixQuery {
    field: String,
    value: String,
    boost: Option<f64>,
}

impl PrefixQuery {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl Emit for PrefixQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("prefix", |p| {
            p.object(&self.field, |f| {
                f.field("value", self.value.as_str());
                f.field_opt("boost", &self.boost);
            })
        });
    }
}

/// Pattern match with `*` and `?`
#[derive(Debug, Clone, PartialEq)]
pub struct WildcardQuery {
    field: String,
    value: String,
    boost: Option<f64>,
}

impl WildcardQuery {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl Emit for WildcardQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("wildcard", |p| {
            p.object(&self.field, |f| {
                f.field("value", self.value.as_str());
                f.field_opt("boost", &self.boost);
            })
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdsQuery {
    doc_types: Option<Vec<String>>,
    values: Vec<String>,
}

impl IdsQuery {
    pub fn new<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self {
            doc_types: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Restrict to the given document types
    pub fn doc_types<S: Into<String>>(mut self, types: impl IntoIterator<Item = S>) -> Self {
        self.doc_types = Some(types.into_iter().map(Into::into).collect());
        self
    }
}

impl Emit for IdsQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("ids", |i| {
            i.list_opt("type", &self.doc_types);
            i.list("values", &self.values);
        });
    }
}
