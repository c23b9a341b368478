//! Full-text queries

use crate::json::{Emit, JsonWriter};
use serde_json::Value;

/// Default boolean operator between terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl From<Operator> for Value {
    fn from(op: Operator) -> Self {
        Value::from(match op {
            Operator::And => "and",
            Operator::Or => "or",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    field: String,
    query: String,
    operator: Option<Operator>,
    fuzziness: Option<Value>,
    analyzer: Option<String>,
    minimum_should_match: Option<Value>,
    boost: Option<f64>,
}

impl MatchQuery {
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
            operator: None,
            fuzziness: None,
            analyzer: None,
            minimum_should_match: None,
            boost: None,
        }
    }

    pub fn operator(mut self, op: Operator) -> Self {
        self.operator = Some(op);
        self
    }

    /// `"AUTO"` or an edit distance
    pub fn fuzziness(mut self, fuzziness: impl Into<Value>) -> Self {
        self.fuzziness = Some(fuzziness.into());
        self
    }

    pub fn analyzer(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }

    pub fn minimum_should_match(mut self, value: impl Into<Value>) -> Self {
        self.minimum_should_match = Some(value.into());
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl Emit for MatchQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("match", |m| {
            m.object(&self.field, |f| {
                f.field("query", self.query.as_str());
                f.field_opt("operator", &self.operator);
                f.field_opt("fuzziness", &self.fuzziness);
                f.field_opt("analyzer", &self.analyzer);
                f.field_opt("minimum_should_match", &self.minimum_should_match);
                f.field_opt("boost", &self.boost);
            })
        });
    }
}

/// Operators enabled for `simple_query_string` parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleQueryFlag {
    All,
    None,
    And,
    Or,
    Not,
    Prefix,
    Phrase,
    Precedence,
    Escape,
    Whitespace,
    Fuzzy,
    Near,
    Slop,
}

impl SimpleQueryFlag {
    fn as_str(self) -> &'static str {
        match self {
            SimpleQueryFlag::All => "ALL",
            SimpleQueryFlag::None => "NONE",
            SimpleQueryFlag::And => "AND",
            SimpleQueryFlag::Or => "OR",
            SimpleQueryFlag::Not => "NOT",
            SimpleQueryFlag::Prefix => "PREFIX",
            SimpleQueryFlag::Phrase => "PHRASE",
            SimpleQueryFlag::Precedence => "PRECEDENCE",
            SimpleQueryFlag::Escape => "ESCAPE",
            SimpleQueryFlag::Whitespace => "WHITESPACE",
            SimpleQueryFlag::Fuzzy => "FUZZY",
            SimpleQueryFlag::Near => "NEAR",
            SimpleQueryFlag::Slop => "SLOP",
        }
    }
}

/// Lenient query-string syntax that never fails to parse
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleQueryStringQuery {
    query: String,
    fields: Option<Vec<String>>,
    default_operator: Option<Operator>,
    analyzer: Option<String>,
    lowercase_expanded_terms: Option<bool>,
    lenient: Option<bool>,
    flags: Option<Vec<SimpleQueryFlag>>,
    locale: Option<String>,
}

impl SimpleQueryStringQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            fields: None,
            default_operator: None,
            analyzer: None,
            lowercase_expanded_terms: None,
            lenient: None,
            flags: None,
            locale: None,
        }
    }

    pub fn fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn default_operator(mut self, op: Operator) -> Self {
        self.default_operator = Some(op);
        self
    }

    pub fn analyzer(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }

    pub fn lowercase_expanded_terms(mut self, on: bool) -> Self {
        self.lowercase_expanded_terms = Some(on);
        self
    }

    pub fn lenient(mut self, on: bool) -> Self {
        self.lenient = Some(on);
        self
    }

    pub fn flags(mut self, flags: impl IntoIterator<Item = SimpleQueryFlag>) -> Self {
        self.flags = Some(flags.into_iter().collect());
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

impl Emit for SimpleQueryStringQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("simple_query_string", |s| {
            s.field("query", self.query.as_str());
            s.list_opt("fields", &self.fields);
            s.field_opt("default_operator", &self.default_operator);
            s.field_opt("analyzer", &self.analyzer);
            s.field_opt("lowercase_expanded_terms", &self.lowercase_expanded_terms);
            s.field_opt("lenient", &self.lenient);
            if let Some(flags) = &self.flags {
                let joined: Vec<&str> = flags.iter().map(|f| f.as_str()).collect();
                s.field("flags", joined.join("|"));
            }
            s.field_opt("locale", &self.locale);
        });
    }
}

/// Full Lucene query-string syntax
#[derive(Debug, Clone, PartialEq)]
pub struct QueryStringQuery {
    query: String,
    default_field: Option<String>,
    fields: Option<Vec<String>>,
    default_operator: Option<Operator>,
    analyze_wildcard: Option<bool>,
    lenient: Option<bool>,
    boost: Option<f64>,
}

impl QueryStringQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            default_field: None,
            fields: None,
            default_operator: None,
            analyze_wildcard: None,
            lenient: None,
            boost: None,
        }
    }

    pub fn default_field(mut self, field: impl Into<String>) -> Self {
        self.default_field = Some(field.into());
        self
    }

    pub fn fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn default_operator(mut self, op: Operator) -> Self {
        self.default_operator = Some(op);
        self
    }

    pub fn analyze_wildcard(mut self, on: bool) -> Self {
        self.analyze_wildcard = Some(on);
        self
    }

    pub fn lenient(mut self, on: bool) -> Self {
        self.lenient = Some(on);
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl Emit for QueryStringQuery {
    fn emit(&self, w: &mut JsonWriter) {
        w.object("query_string", |s| {
            s.field("query", self.query.as_str());
            s.field_opt("default_field", &self.default_field);
            s.list_opt("fields", &self.fields);
            s.field_opt("default_operator", &self.default_operator);
            s.field_opt("analyze_wildcard", &self.analyze_wildcard);
            s.field_opt("lenient", &self.lenient);
            s.field_opt("boost", &self.boost);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_minimal() {
        assert_eq!(
            MatchQuery::new("title", "quick fox").to_json(),
            r#"{"match":{"title":{"query":"quick fox"}}}"#
        );
    }

    #[test]
    fn test_match_with_options() {
        let q = MatchQuery::new("title", "quick fox")
            .operator(Operator::And)
            .fuzziness("AUTO");
        assert_eq!(
            q.to_json_value(),
            json!({"match": {"title": {"query": "quick fox", "operator": "and", "fuzziness": "AUTO"}}})
        );
    }

    #[test]
    fn test_simple_query_string_fields_only_when_set() {
        let bare = SimpleQueryStringQuery::new("rust -java");
        assert_eq!(
            bare.to_json(),
            r#"{"simple_query_string":{"query":"rust -java"}}"#
        );

        let full = SimpleQueryStringQuery::new("rust")
            .fields(["title^2", "body"])
            .default_operator(Operator::And)
            .lenient(false)
            .flags([SimpleQueryFlag::Or, SimpleQueryFlag::Prefix]);
        assert_eq!(
            full.to_json_value(),
            json!({
                "simple_query_string": {
                    "query": "rust",
                    "fields": ["title^2", "body"],
                    "default_operator": "and",
                    "lenient": false,
                    "flags": "OR|PREFIX"
                }
            })
        );
    }

    #[test]
    fn test_query_string() {
        let q = QueryStringQuery::new("title:(quick OR brown)")
            .default_field("body")
            .analyze_wildcard(true);
        assert_eq!(
            q.to_json(),
            r#"{"query_string":{"query":"title:(quick OR brown)","default_field":"body","analyze_wildcard":true}}"#
        );
    }
}
