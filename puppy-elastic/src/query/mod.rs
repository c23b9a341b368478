//! Query DSL node model
//!
//! Each node owns its children and writes itself through [`Emit`]; there is
//! no separate compile step. The same [`Query`] type is used in query and in
//! filter context (bool `filter` clauses, `constant_score`, filter
//! aggregations).

mod compound;
mod full_text;
mod geo;
mod span;
mod term_level;

pub use compound::{BoolQuery, ConstantScoreQuery, NestedQuery, ScoreMode};
pub use full_text::{
    MatchQuery, Operator, QueryStringQuery, SimpleQueryFlag, SimpleQueryStringQuery,
};
pub use geo::{GeoDistanceQuery, OptimizeBbox};
pub use span::{
    SpanFirstQuery, SpanMultiQuery, SpanNearQuery, SpanNotQuery, SpanOrQuery, SpanQuery,
    SpanTermQuery,
};
pub use term_level::{
    ExistsQuery, IdsQuery, MatchAllQuery, PrefixQuery, RangeQuery, TermQuery, TermsQuery,
    WildcardQuery,
};

use crate::json::{Emit, JsonWriter};
use serde_json::Value;

/// A query or filter node
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    MatchAll(MatchAllQuery),
    Match(MatchQuery),
    Term(TermQuery),
    Terms(TermsQuery),
    Range(RangeQuery),
    Exists(ExistsQuery),
    Prefix(PrefixQuery),
    Wildcard(WildcardQuery),
    Ids(IdsQuery),
    Bool(BoolQuery),
    ConstantScore(ConstantScoreQuery),
    Nested(NestedQuery),
    SimpleQueryString(SimpleQueryStringQuery),
    QueryString(QueryStringQuery),
    GeoDistance(GeoDistanceQuery),
    Span(SpanQuery),
}

impl Query {
    pub fn match_all() -> Self {
        Query::MatchAll(MatchAllQuery::default())
    }

    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Term(TermQuery::new(field, value))
    }

    pub fn terms<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Query::Terms(TermsQuery::new(field, values))
    }

    pub fn matches(field: impl Into<String>, query: impl Into<String>) -> Self {
        Query::Match(MatchQuery::new(field, query))
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Query::Exists(ExistsQuery::new(field))
    }

    pub fn ids<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Query::Ids(IdsQuery::new(values))
    }
}

impl Emit for Query {
    fn emit(&self, w: &mut JsonWriter) {
        match self {
            Query::MatchAll(q) => q.emit(w),
            Query::Match(q) => q.emit(w),
            Query::Term(q) => q.emit(w),
            Query::Terms(q) => q.emit(w),
            Query::Range(q) => q.emit(w),
            Query::Exists(q) => q.emit(w),
            Query::Prefix(q) => q.emit(w),
            Query::Wildcard(q) => q.emit(w),
            Query::Ids(q) => q.emit(w),
            Query::Bool(q) => q.emit(w),
            Query::ConstantScore(q) => q.emit(w),
            Query::Nested(q) => q.emit(w),
            Query::SimpleQueryString(q) => q.emit(w),
            Query::QueryString(q) => q.emit(w),
            Query::GeoDistance(q) => q.emit(w),
            Query::Span(q) => q.emit(w),
        }
    }
}

macro_rules! impl_into_query {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Query {
                fn from(q: $ty) -> Self {
                    Query::$variant(q)
                }
            }
        )*
    };
}

impl_into_query! {
    MatchAllQuery => MatchAll,
    MatchQuery => Match,
    TermQuery => Term,
    TermsQuery => Terms,
    RangeQuery => Range,
    ExistsQuery => Exists,
    PrefixQuery => Prefix,
    WildcardQuery => Wildcard,
    IdsQuery => Ids,
    BoolQuery => Bool,
    ConstantScoreQuery => ConstantScore,
    NestedQuery => Nested,
    SimpleQueryStringQuery => SimpleQueryString,
    QueryStringQuery => QueryString,
    GeoDistanceQuery => GeoDistance,
    SpanQuery => Span,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bool_must_term_must_not_range() {
        let query = BoolQuery::new()
            .must(Query::term("color", "red"))
            .must_not(RangeQuery::new("price").gte(100));

        let value = Query::from(query).to_json_value();
        assert_eq!(
            value,
            json!({
                "bool": {
                    "must": [ { "term": { "color": "red" } } ],
                    "must_not": [ { "range": { "price": { "gte": 100 } } } ]
                }
            })
        );
        let bool_obj = value["bool"].as_object().unwrap();
        assert_eq!(bool_obj.len(), 2);
    }

    #[test]
    fn test_emission_is_deterministic() {
        let query: Query = BoolQuery::new()
            .should(Query::matches("title", "rust"))
            .should(Query::terms("tags", ["a", "b"]))
            .filter(Query::exists("published"))
            .minimum_should_match(1)
            .into();
        assert_eq!(query.to_json(), query.to_json());
    }

    #[test]
    fn test_constructor_helpers() {
        assert_eq!(Query::match_all().to_json(), r#"{"match_all":{}}"#);
        assert_eq!(
            Query::ids(["1", "2"]).to_json(),
            r#"{"ids":{"values":["1","2"]}}"#
        );
    }
}
