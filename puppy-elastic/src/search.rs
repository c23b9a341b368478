//! Search request body and URL parameters

use crate::aggregation::{emit_aggs, Aggregation};
use crate::json::{Emit, JsonWriter};
use crate::query::Query;
use crate::units::{SortOrder, TimeUnit};
use serde_json::Value;

/// Sort on one field
#[derive(Debug, Clone, PartialEq)]
pub struct SortField {
    field: String,
    order: Option<SortOrder>,
    missing: Option<Value>,
}

impl SortField {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: None,
            missing: None,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field).order(SortOrder::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field).order(SortOrder::Desc)
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// `"_last"`, `"_first"` or a substitute value
    pub fn missing(mut self, missing: impl Into<Value>) -> Self {
        self.missing = Some(missing.into());
        self
    }
}

impl Emit for SortField {
    fn emit(&self, w: &mut JsonWriter) {
        w.object(&self.field, |s| {
            s.field_opt("order", &self.order);
            s.field_opt("missing", &self.missing);
        });
    }
}

/// `_source` filtering
#[derive(Debug, Clone, PartialEq)]
pub enum SourceFilter {
    Enabled(bool),
    Fields(Vec<String>),
}

impl From<SourceFilter> for Value {
    fn from(filter: SourceFilter) -> Self {
        match filter {
            SourceFilter::Enabled(on) => Value::Bool(on),
            SourceFilter::Fields(fields) => {
                Value::Array(fields.into_iter().map(Value::String).collect())
            }
        }
    }
}

/// Root of a search request body.
///
/// Only properties that were set are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Search {
    query: Option<Query>,
    from: Option<u64>,
    size: Option<u64>,
    sort: Option<Vec<SortField>>,
    source: Option<SourceFilter>,
    aggs: Vec<Aggregation>,
}

impl Search {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn from(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn sort(mut self, sort: SortField) -> Self {
        self.sort.get_or_insert_with(Vec::new).push(sort);
        self
    }

    pub fn source(mut self, source: SourceFilter) -> Self {
        self.source = Some(source);
        self
    }

    pub fn aggregation(mut self, agg: impl Into<Aggregation>) -> Self {
        self.aggs.push(agg.into());
        self
    }

    pub fn query_node(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    pub fn aggregations(&self) -> &[Aggregation] {
        &self.aggs
    }

    /// Body for endpoints that only take the query (`_count`)
    pub(crate) fn query_body(&self) -> String {
        let mut w = JsonWriter::new();
        if let Some(query) = &self.query {
            w.emit_in("query", query);
        }
        w.into_string()
    }
}

impl Emit for Search {
    fn emit(&self, w: &mut JsonWriter) {
        if let Some(query) = &self.query {
            w.emit_in("query", query);
        }
        w.field_opt("from", &self.from);
        w.field_opt("size", &self.size);
        if let Some(sort) = &self.sort {
            w.array("sort", |a| {
                for field in sort {
                    a.emit(field);
                }
            });
        }
        w.field_opt("_source", &self.source);
        emit_aggs(w, &self.aggs);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    QueryThenFetch,
    DfsQueryThenFetch,
    Count,
    Scan,
}

impl SearchType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SearchType::QueryThenFetch => "query_then_fetch",
            SearchType::DfsQueryThenFetch => "dfs_query_then_fetch",
            SearchType::Count => "count",
            SearchType::Scan => "scan",
        }
    }
}

/// Query-string parameters appended to a search URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchUrlParameters {
    routing: Option<String>,
    search_type: Option<SearchType>,
    timeout: Option<TimeUnit>,
}

impl SearchUrlParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routing(mut self, routing: impl Into<String>) -> Self {
        self.routing = Some(routing.into());
        self
    }

    pub fn search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = Some(search_type);
        self
    }

    pub fn timeout(mut self, timeout: TimeUnit) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Render as `?routing=..&search_type=..&timeout=..`, in that order and
    /// URL-encoded. Empty when nothing is set.
    pub fn render(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(routing) = &self.routing {
            query.append_pair("routing", routing);
        }
        if let Some(search_type) = self.search_type {
            query.append_pair("search_type", search_type.as_str());
        }
        if let Some(timeout) = self.timeout {
            query.append_pair("timeout", &timeout.to_string());
        }
        let query = query.finish();
        if query.is_empty() {
            String::new()
        } else {
            format!("?{}", query)
        }
    }
}

/// Render optional parameters, `""` for `None`
pub(crate) fn render_params(params: Option<&SearchUrlParameters>) -> String {
    params.map(SearchUrlParameters::render).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{BucketAggregation, MetricAggregation, TermsAgg};
    use crate::query::{BoolQuery, RangeQuery};
    use serde_json::json;

    #[test]
    fn test_empty_search_body() {
        assert_eq!(Search::new().to_json(), "{}");
    }

    #[test]
    fn test_full_search_body_order() {
        let search = Search::new()
            .query(
                BoolQuery::new()
                    .must(Query::term("color", "red"))
                    .must_not(RangeQuery::new("price").gte(100)),
            )
            .from(0)
            .size(20)
            .sort(SortField::desc("created"))
            .source(SourceFilter::Fields(vec!["name".to_string()]))
            .aggregation(
                BucketAggregation::new("by_color", TermsAgg::new("color"))
                    .sub_aggregation(MetricAggregation::avg("avg_price", "price")),
            );

        let body = search.to_json();
        assert!(body.starts_with(r#"{"query":{"bool":{"must":[{"term":{"color":"red"}}]"#));
        let value: Value = serde_json::from_str(&body).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["query", "from", "size", "sort", "_source", "aggs"]);
        assert_eq!(value["sort"], json!([{"created": {"order": "desc"}}]));
        assert_eq!(value["aggs"]["by_color"]["aggs"]["avg_price"]["avg"]["field"], "price");
    }

    #[test]
    fn test_from_zero_is_written() {
        let body = Search::new().from(0).to_json();
        assert_eq!(body, r#"{"from":0}"#);
    }

    #[test]
    fn test_query_body() {
        let search = Search::new().query(Query::match_all()).size(5);
        assert_eq!(search.query_body(), r#"{"query":{"match_all":{}}}"#);
        assert_eq!(Search::new().query_body(), "{}");
    }

    #[test]
    fn test_url_parameters() {
        assert_eq!(SearchUrlParameters::new().render(), "");
        assert_eq!(render_params(None), "");

        let params = SearchUrlParameters::new()
            .timeout(TimeUnit::Seconds(5))
            .routing("user 1&2")
            .search_type(SearchType::DfsQueryThenFetch);
        assert_eq!(
            params.render(),
            "?routing=user+1%262&search_type=dfs_query_then_fetch&timeout=5s"
        );
    }
}
