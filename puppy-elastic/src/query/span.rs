//! Positional span queries
//!
//! Span queries only accept other span queries as children, which is why
//! they form their own enum instead of nesting arbitrary [`Query`] nodes.

use super::Query;
use crate::json::{Emit, JsonWriter};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum SpanQuery {
    Term(SpanTermQuery),
    First(SpanFirstQuery),
    Near(SpanNearQuery),
    Or(SpanOrQuery),
    Not(SpanNotQuery),
    Multi(SpanMultiQuery),
}

impl SpanQuery {
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        SpanQuery::Term(SpanTermQuery::new(field, value))
    }
}

impl Emit for SpanQuery {
    fn emit(&self, w: &mut JsonWriter) {
        match self {
            SpanQuery::Term(q) => q.emit(w),
            SpanQuery::First(q) => q.emit(w),
            SpanQuery::Near(q) => q.emit(w),
            SpanQuery::Or(q) => q.emit(w),
            SpanQuery::Not(q) => q.emit(w),
            SpanQuery::Multi(q) => q.emit(w),
        }
    }
}

impl From<SpanTermQuery> for SpanQuery {
    fn from(q: SpanTermQuery) -> Self {
        SpanQuery::Term(q)
    }
}

impl From<SpanFirstQuery> for SpanQuery {
    fn from(q: SpanFirstQuery) -> Self {
        SpanQuery::First(q)
    }
}

impl From<SpanNearQuery> for SpanQuery {
    fn from(q: SpanNearQuery) -> Self {
        SpanQuery::Near(q)
    }
}

impl From<SpanOrQuery> for SpanQuery {
    fn from(q: SpanOrQuery) -> Self {
        SpanQuery::Or(q)
    }
}

impl From<SpanNotQuery> for SpanQuery {
    fn from(q: SpanNotQuery) -> Self {
        SpanQuery::Not(q)
    }
}

impl From<SpanMultiQuery> for SpanQuery {
    fn from(q: SpanMultiQuery) -> Self {
        SpanQuery::Multi(q)
    }
}

fn emit_span_list(w: &mut JsonWriter, name: &str, clauses: &[SpanQuery]) {
    w.array(name, |a| {
        for clause in clauses {
            a.emit(clause);
        }
    });
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpanTermQuery {
    field: String,
    value: Value,
    boost: Option<f64>,
}

impl SpanTermQuery {
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

impl Emit for SpanTermQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("span_term", |t| {
            t.object(&self.field, |f| {
                f.field("value", self.value.clone());
                f.field_opt("boost", &self.boost);
            })
        });
    }
}

/// Matches spans ending at or before position `end`
#[derive(Debug, Clone, PartialEq)]
pub struct SpanFirstQuery {
    span: Box<SpanQuery>,
    end: u32,
}

impl SpanFirstQuery {
    pub fn new(span: impl Into<SpanQuery>, end: u32) -> Self {
        Self {
            span: Box::new(span.into()),
            end,
        }
    }
}

impl Emit for SpanFirstQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("span_first", |f| {
            f.emit_in("match", self.span.as_ref());
            f.field("end", self.end);
        });
    }
}

/// Spans within `slop` positions of each other
#[derive(Debug, Clone, PartialEq)]
pub struct SpanNearQuery {
    clauses: Vec<SpanQuery>,
    slop: u32,
    in_order: Option<bool>,
    collect_payloads: Option<bool>,
}

impl SpanNearQuery {
    pub fn new(slop: u32) -> Self {
        Self {
            clauses: Vec::new(),
            slop,
            in_order: None,
            collect_payloads: None,
        }
    }

    pub fn clause(mut self, span: impl Into<SpanQuery>) -> Self {
        self.clauses.push(span.into());
        self
    }

    pub fn in_order(mut self, on: bool) -> Self {
        self.in_order = Some(on);
        self
    }

    pub fn collect_payloads(mut self, on: bool) -> Self {
        self.collect_payloads = Some(on);
        self
    }
}

impl Emit for SpanNearQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("span_near", |n| {
            emit_span_list(n, "clauses", &self.clauses);
            n.field("slop", self.slop);
            n.field_opt("in_order", &self.in_order);
            n.field_opt("collect_payloads", &self.collect_payloads);
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpanOrQuery {
    clauses: Vec<SpanQuery>,
}

impl SpanOrQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clause(mut self, span: impl Into<SpanQuery>) -> Self {
        self.clauses.push(span.into());
        self
    }
}

impl Emit for SpanOrQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("span_or", |o| emit_span_list(o, "clauses", &self.clauses));
    }
}

/// Removes `include` matches that overlap `exclude` matches.
///
/// The overlap window is either symmetric (`dist`) or given as separate
/// `pre`/`post` sizes; setting one form clears the other.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanNotQuery {
    include: Box<SpanQuery>,
    exclude: Box<SpanQuery>,
    dist: Option<u32>,
    pre: Option<u32>,
    post: Option<u32>,
}

impl SpanNotQuery {
    pub fn new(include: impl Into<SpanQuery>, exclude: impl Into<SpanQuery>) -> Self {
        Self {
            include: Box::new(include.into()),
            exclude: Box::new(exclude.into()),
            dist: None,
            pre: None,
            post: None,
        }
    }

    pub fn dist(mut self, dist: u32) -> Self {
        self.dist = Some(dist);
        self.pre = None;
        self.post = None;
        self
    }

    pub fn pre(mut self, pre: u32) -> Self {
        self.pre = Some(pre);
        self.dist = None;
        self
    }

    pub fn post(mut self, post: u32) -> Self {
        self.post = Some(post);
        self.dist = None;
        self
    }
}

impl Emit for SpanNotQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("span_not", |n| {
            n.emit_in("include", self.include.as_ref());
            n.emit_in("exclude", self.exclude.as_ref());
            if self.dist.is_some() {
                n.field_opt("dist", &self.dist);
            } else {
                n.field_opt("pre", &self.pre);
                n.field_opt("post", &self.post);
            }
        });
    }
}

/// Wraps a multi-term query (prefix, wildcard, ...) as a span
#[derive(Debug, Clone, PartialEq)]
pub struct SpanMultiQuery {
    query: Box<Query>,
}

impl SpanMultiQuery {
    pub fn new(query: impl Into<Query>) -> Self {
        Self {
            query: Box::new(query.into()),
        }
    }
}

impl Emit for SpanMultiQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("span_multi", |m| m.emit_in("match", self.query.as_ref()));
    }
}
