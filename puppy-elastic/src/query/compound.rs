//! Compound queries that wrap other queries

use super::Query;
use crate::json::{Emit, JsonWriter};
use serde_json::Value;

/// Boolean combination of clauses.
///
/// Each clause kind is written as an array of single-property objects and
/// only when it has at least one entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    must: Vec<Query>,
    must_not: Vec<Query>,
    should: Vec<Query>,
    filter: Vec<Query>,
    minimum_should_match: Option<Value>,
    boost: Option<f64>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, query: impl Into<Query>) -> Self {
        self.must.push(query.into());
        self
    }

    pub fn must_not(mut self, query: impl Into<Query>) -> Self {
        self.must_not.push(query.into());
        self
    }

    pub fn should(mut self, query: impl Into<Query>) -> Self {
        self.should.push(query.into());
        self
    }

    /// Add a non-scoring clause
    pub fn filter(mut self, query: impl Into<Query>) -> Self {
        self.filter.push(query.into());
        self
    }

    /// Either a count (`2`) or a percentage (`"75%"`)
    pub fn minimum_should_match(mut self, value: impl Into<Value>) -> Self {
        self.minimum_should_match = Some(value.into());
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.must_not.is_empty()
            && self.should.is_empty()
            && self.filter.is_empty()
    }
}

fn emit_clauses(w: &mut JsonWriter, name: &str, clauses: &[Query]) {
    if clauses.is_empty() {
        return;
    }
    w.array(name, |a| {
        for clause in clauses {
            a.emit(clause);
        }
    });
}

impl Emit for BoolQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("bool", |b| {
            emit_clauses(b, "must", &self.must);
            emit_clauses(b, "must_not", &self.must_not);
            emit_clauses(b, "should", &self.should);
            emit_clauses(b, "filter", &self.filter);
            b.field_opt("minimum_should_match", &self.minimum_should_match);
            b.field_opt("boost", &self.boost);
        });
    }
}

/// Wraps a filter and gives every match the same score
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantScoreQuery {
    filter: Box<Query>,
    boost: Option<f64>,
}

impl ConstantScoreQuery {
    pub fn new(filter: impl Into<Query>) -> Self {
        Self {
            filter: Box::new(filter.into()),
            boost: None,
        }
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl Emit for ConstantScoreQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("constant_score", |c| {
            c.emit_in("filter", self.filter.as_ref());
            c.field_opt("boost", &self.boost);
        });
    }
}

/// How scores of matching nested documents are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMode {
    Avg,
    Sum,
    Min,
    Max,
    None,
}

impl From<ScoreMode> for Value {
    fn from(mode: ScoreMode) -> Self {
        Value::from(match mode {
            ScoreMode::Avg => "avg",
            ScoreMode::Sum => "sum",
            ScoreMode::Min => "min",
            ScoreMode::Max => "max",
            ScoreMode::None => "none",
        })
    }
}

/// Query against nested objects under `path`
#[derive(Debug, Clone, PartialEq)]
pub struct NestedQuery {
    path: String,
    query: Box<Query>,
    score_mode: Option<ScoreMode>,
}

impl NestedQuery {
    pub fn new(path: impl Into<String>, query: impl Into<Query>) -> Self {
        Self {
            path: path.into(),
            query: Box::new(query.into()),
            score_mode: None,
        }
    }

    pub fn score_mode(mut self, mode: ScoreMode) -> Self {
        self.score_mode = Some(mode);
        self
    }
}

impl Emit for NestedQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("nested", |n| {
            n.field("path", self.path.as_str());
            n.emit_in("query", self.query.as_ref());
            n.field_opt("score_mode", &self.score_mode);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::RangeQuery;
    use serde_json::json;

    #[test]
    fn test_empty_bool_writes_empty_object() {
        assert_eq!(BoolQuery::new().to_json(), r#"{"bool":{}}"#);
        assert!(BoolQuery::new().is_empty());
    }

    #[test]
    fn test_bool_clause_order_and_options() {
        let q = BoolQuery::new()
            .filter(Query::term("a", 1))
            .should(Query::term("b", 2))
            .minimum_should_match("50%")
            .boost(1.2);
        assert_eq!(
            q.to_json(),
            r#"{"bool":{"should":[{"term":{"b":2}}],"filter":[{"term":{"a":1}}],"minimum_should_match":"50%","boost":1.2}}"#
        );
    }

    #[test]
    fn test_nested_bool_inside_bool() {
        let inner = BoolQuery::new().must(Query::exists("x"));
        let outer = BoolQuery::new().must(inner);
        assert_eq!(
            outer.to_json_value(),
            json!({"bool": {"must": [{"bool": {"must": [{"exists": {"field": "x"}}]}}]}})
        );
    }

    #[test]
    fn test_constant_score() {
        let q = ConstantScoreQuery::new(Query::term("in_stock", true)).boost(3.0);
        assert_eq!(
            q.to_json_value(),
            json!({"constant_score": {"filter": {"term": {"in_stock": true}}, "boost": 3.0}})
        );
    }

    #[test]
    fn test_nested_query() {
        let q = NestedQuery::new("variants", RangeQuery::new("variants.price").lt(10))
            .score_mode(ScoreMode::Max);
        assert_eq!(
            q.to_json_value(),
            json!({
                "nested": {
                    "path": "variants",
                    "query": {"range": {"variants.price": {"lt": 10}}},
                    "score_mode": "max"
                }
            })
        );
    }
}
