//! Response mappers from Elasticsearch JSON to typed results

use crate::error::{ElasticError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// ES search response format
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct SearchResult<T> {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(rename = "_shards", default)]
    pub shards: ShardStats,
    pub hits: Hits<T>,
    #[serde(default)]
    pub aggregations: Aggregations,
    #[serde(rename = "_scroll_id")]
    pub scroll_id: Option<String>,
}

impl<T> SearchResult<T> {
    /// Sources of all hits, in hit order
    pub fn documents(&self) -> impl Iterator<Item = &T> {
        self.hits.hits.iter().filter_map(|h| h.source.as_ref())
    }

    pub fn into_documents(self) -> Vec<T> {
        self.hits
            .hits
            .into_iter()
            .filter_map(|h| h.source)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.hits.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShardStats {
    pub total: u32,
    pub successful: u32,
    pub failed: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Hits<T> {
    #[serde(deserialize_with = "total_hits")]
    pub total: u64,
    pub max_score: Option<f64>,
    pub hits: Vec<Hit<T>>,
}

/// Total is a number in 1.x and `{"value": n, "relation": ..}` later
fn total_hits<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Total {
        Count(u64),
        Object { value: u64 },
    }

    Ok(match Total::deserialize(deserializer)? {
        Total::Count(n) => n,
        Total::Object { value } => value,
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Hit<T> {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type", default)]
    pub doc_type: Option<String>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score")]
    pub score: Option<f64>,
    #[serde(rename = "_source")]
    pub source: Option<T>,
    #[serde(rename = "_version")]
    pub version: Option<u64>,
    #[serde(rename = "_routing")]
    pub routing: Option<String>,
    pub highlight: Option<HashMap<String, Vec<String>>>,
    pub fields: Option<HashMap<String, Value>>,
    pub sort: Option<Vec<Value>>,
}

/// ES get response format
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct GetResult<T> {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type", default)]
    pub doc_type: Option<String>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_version")]
    pub version: Option<u64>,
    pub found: bool,
    #[serde(rename = "_source")]
    pub source: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ExistsResponse {
    pub exists: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CountResponse {
    pub count: u64,
}

// ============================================================================
// Aggregations
// ============================================================================

/// Raw aggregation results keyed by aggregation name, decoded on demand
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Aggregations(HashMap<String, Value>);

impl Aggregations {
    /// Decode the named aggregation into `R`
    pub fn get<R: DeserializeOwned>(&self, name: &str) -> Result<R> {
        let raw = self
            .0
            .get(name)
            .ok_or_else(|| ElasticError::KeyNotFound(name.to_string()))?;
        Ok(R::deserialize(raw)?)
    }

    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn value(&self, name: &str) -> Result<ValueMetric> {
        self.get(name)
    }

    pub fn stats(&self, name: &str) -> Result<StatsMetric> {
        self.get(name)
    }

    pub fn terms(&self, name: &str) -> Result<BucketsResult<KeyBucket>> {
        self.get(name)
    }

    pub fn single_bucket(&self, name: &str) -> Result<SingleBucket> {
        self.get(name)
    }
}

/// Lazy access to the sub-aggregations carried by a bucket-shaped result
pub trait SubAggregations {
    fn sub_aggregations(&self) -> &HashMap<String, Value>;

    /// Decode the named sub-aggregation into `R`
    fn sub_aggregation<R: DeserializeOwned>(&self, name: &str) -> Result<R> {
        let raw = self
            .sub_aggregations()
            .get(name)
            .ok_or_else(|| ElasticError::KeyNotFound(name.to_string()))?;
        Ok(R::deserialize(raw)?)
    }

    /// Read `value` of a single-value metric sub-aggregation
    fn single_metric_value<V: DeserializeOwned>(&self, name: &str) -> Result<V> {
        let raw = self
            .sub_aggregations()
            .get(name)
            .ok_or_else(|| ElasticError::KeyNotFound(name.to_string()))?;
        let value = raw
            .get("value")
            .ok_or_else(|| ElasticError::KeyNotFound(format!("{}.value", name)))?;
        Ok(V::deserialize(value)?)
    }
}

macro_rules! impl_sub_aggregations {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SubAggregations for $ty {
                fn sub_aggregations(&self) -> &HashMap<String, Value> {
                    &self.sub_aggregations
                }
            }
        )*
    };
}

/// avg, sum, min, max, value_count, cardinality
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValueMetric {
    pub value: Option<f64>,
    pub value_as_string: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatsMetric {
    pub count: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub sum: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StdDeviationBounds {
    pub upper: Option<f64>,
    pub lower: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtendedStatsMetric {
    pub count: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub sum: Option<f64>,
    pub sum_of_squares: Option<f64>,
    pub variance: Option<f64>,
    pub std_deviation: Option<f64>,
    pub std_deviation_bounds: Option<StdDeviationBounds>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PercentilesMetric {
    pub values: BTreeMap<String, Option<f64>>,
}

impl PercentilesMetric {
    /// Value for a percent such as `99.0`
    pub fn percentile(&self, percent: f64) -> Option<f64> {
        self.values
            .iter()
            .find(|(k, _)| k.parse::<f64>().map(|p| p == percent).unwrap_or(false))
            .and_then(|(_, v)| *v)
    }
}

/// filter, nested, reverse_nested, global, missing
#[derive(Debug, Clone, Deserialize)]
pub struct SingleBucket {
    pub doc_count: u64,
    #[serde(flatten)]
    pub sub_aggregations: HashMap<String, Value>,
}

/// Bucket of terms, histogram and date_histogram results
#[derive(Debug, Clone, Deserialize)]
pub struct KeyBucket {
    pub key: Value,
    pub key_as_string: Option<String>,
    pub doc_count: u64,
    #[serde(flatten)]
    pub sub_aggregations: HashMap<String, Value>,
}

/// Bucket of range, date_range and geo_distance results
#[derive(Debug, Clone, Deserialize)]
pub struct RangeBucket {
    pub key: Option<String>,
    pub from: Option<f64>,
    pub from_as_string: Option<String>,
    pub to: Option<f64>,
    pub to_as_string: Option<String>,
    pub doc_count: u64,
    #[serde(flatten)]
    pub sub_aggregations: HashMap<String, Value>,
}

/// Bucket of filters results: no key, the name is the map key
#[derive(Debug, Clone, Deserialize)]
pub struct DocCountBucket {
    pub doc_count: u64,
    #[serde(flatten)]
    pub sub_aggregations: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignificantTermsBucket {
    pub key: Value,
    pub doc_count: u64,
    pub score: f64,
    pub bg_count: u64,
    #[serde(flatten)]
    pub sub_aggregations: HashMap<String, Value>,
}

impl_sub_aggregations!(
    SingleBucket,
    KeyBucket,
    RangeBucket,
    DocCountBucket,
    SignificantTermsBucket,
);

/// Buckets in list form, in engine order
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "B: DeserializeOwned"))]
pub struct BucketsResult<B> {
    pub buckets: Vec<B>,
    pub doc_count_error_upper_bound: Option<u64>,
    pub sum_other_doc_count: Option<u64>,
}

/// Buckets in keyed form (`"keyed": true`, filters), key → bucket
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "B: DeserializeOwned"))]
pub struct KeyedBucketsResult<B> {
    pub buckets: HashMap<String, B>,
}

impl<B> KeyedBucketsResult<B> {
    pub fn bucket(&self, key: &str) -> Result<&B> {
        self.buckets
            .get(key)
            .ok_or_else(|| ElasticError::KeyNotFound(key.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignificantTermsResult {
    pub doc_count: u64,
    pub buckets: Vec<SignificantTermsBucket>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Product {
        name: String,
        price: f64,
    }

    fn search_response() -> Value {
        json!({
            "took": 3,
            "timed_out": false,
            "_shards": {"total": 5, "successful": 5, "failed": 0},
            "hits": {
                "total": 2,
                "max_score": 1.0,
                "hits": [
                    {"_index": "products", "_type": "product", "_id": "1", "_score": 1.0,
                     "_source": {"name": "lamp", "price": 30.0}},
                    {"_index": "products", "_type": "product", "_id": "2", "_score": 0.5,
                     "_source": {"name": "desk", "price": 120.0}}
                ]
            },
            "aggregations": {
                "by_color": {
                    "doc_count_error_upper_bound": 0,
                    "sum_other_doc_count": 0,
                    "buckets": [
                        {"key": "red", "doc_count": 2, "avg_price": {"value": 75.0}},
                        {"key": "blue", "doc_count": 1, "avg_price": {"value": null}}
                    ]
                },
                "price_stats": {"count": 2, "min": 30.0, "max": 120.0, "avg": 75.0, "sum": 150.0}
            }
        })
    }

    // ========================================================================
    // Search results
    // ========================================================================

    #[test]
    fn test_parse_search_result() {
        let result: SearchResult<Product> = serde_json::from_value(search_response()).unwrap();
        assert_eq!(result.took, 3);
        assert_eq!(result.shards.total, 5);
        assert_eq!(result.hits.total, 2);
        assert_eq!(result.hits.hits[0].doc_type.as_deref(), Some("product"));
        assert!(result.scroll_id.is_none());

        let names: Vec<&str> = result.documents().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["lamp", "desk"]);
    }

    #[test]
    fn test_total_hits_object_form() {
        let raw = json!({"hits": {"total": {"value": 7, "relation": "eq"}, "max_score": null, "hits": []}});
        let result: SearchResult<Value> = serde_json::from_value(raw).unwrap();
        assert_eq!(result.hits.total, 7);
        assert!(result.is_empty());
        assert!(result.aggregations.is_empty());
    }

    #[test]
    fn test_parse_get_result() {
        let raw = json!({"_index": "products", "_type": "product", "_id": "1", "_version": 4,
                         "found": true, "_source": {"name": "lamp", "price": 30.0}});
        let result: GetResult<Product> = serde_json::from_value(raw).unwrap();
        assert!(result.found);
        assert_eq!(result.version, Some(4));
        assert_eq!(result.source.unwrap().name, "lamp");
    }

    // ========================================================================
    // Aggregations
    // ========================================================================

    #[test]
    fn test_terms_buckets_with_sub_aggregation() {
        let result: SearchResult<Product> = serde_json::from_value(search_response()).unwrap();
        let terms = result.aggregations.terms("by_color").unwrap();

        assert_eq!(terms.buckets.len(), 2);
        assert_eq!(terms.buckets[0].key, json!("red"));
        assert_eq!(terms.buckets[0].doc_count, 2);
        assert_eq!(
            terms.buckets[0].single_metric_value::<f64>("avg_price").unwrap(),
            75.0
        );
        assert_eq!(
            terms.buckets[1]
                .single_metric_value::<Option<f64>>("avg_price")
                .unwrap(),
            None
        );
        let metric: ValueMetric = terms.buckets[0].sub_aggregation("avg_price").unwrap();
        assert_eq!(metric.value, Some(75.0));
    }

    #[test]
    fn test_missing_aggregation_is_key_not_found() {
        let result: SearchResult<Product> = serde_json::from_value(search_response()).unwrap();
        let err = result.aggregations.stats("nope").unwrap_err();
        assert!(matches!(err, ElasticError::KeyNotFound(ref k) if k == "nope"));

        let terms = result.aggregations.terms("by_color").unwrap();
        let err = terms.buckets[0]
            .single_metric_value::<f64>("missing_sub")
            .unwrap_err();
        assert!(matches!(err, ElasticError::KeyNotFound(_)));
    }

    #[test]
    fn test_stats_metric() {
        let result: SearchResult<Product> = serde_json::from_value(search_response()).unwrap();
        let stats = result.aggregations.stats("price_stats").unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.sum, Some(150.0));
    }

    #[test]
    fn test_keyed_range_buckets() {
        let raw = json!({
            "buckets": {
                "cheap": {"to": 50.0, "doc_count": 4},
                "expensive": {"from": 50.0, "doc_count": 1, "top": {"value": 99.0}}
            }
        });
        let keyed: KeyedBucketsResult<RangeBucket> = serde_json::from_value(raw).unwrap();
        assert_eq!(keyed.bucket("cheap").unwrap().to, Some(50.0));
        assert_eq!(
            keyed
                .bucket("expensive")
                .unwrap()
                .single_metric_value::<f64>("top")
                .unwrap(),
            99.0
        );
        assert!(keyed.bucket("free").is_err());
    }

    #[test]
    fn test_single_bucket_nesting() {
        let raw = json!({
            "doc_count": 10,
            "sizes": {"buckets": [{"key": "xl", "doc_count": 3}]}
        });
        let nested: SingleBucket = serde_json::from_value(raw).unwrap();
        assert_eq!(nested.doc_count, 10);
        let sizes: BucketsResult<KeyBucket> = nested.sub_aggregation("sizes").unwrap();
        assert_eq!(sizes.buckets[0].key, json!("xl"));
        assert!(sizes.buckets[0].sub_aggregations.is_empty());
    }

    #[test]
    fn test_significant_terms() {
        let raw = json!({
            "doc_count": 47347,
            "buckets": [{"key": "Bicycle theft", "doc_count": 3640, "score": 0.37, "bg_count": 66799}]
        });
        let sig: SignificantTermsResult = serde_json::from_value(raw).unwrap();
        assert_eq!(sig.doc_count, 47347);
        assert_eq!(sig.buckets[0].bg_count, 66799);
    }

    #[test]
    fn test_percentiles_lookup() {
        let raw = json!({"values": {"50.0": 12.5, "99.0": 80.0}});
        let p: PercentilesMetric = serde_json::from_value(raw).unwrap();
        assert_eq!(p.percentile(99.0), Some(80.0));
        assert_eq!(p.percentile(75.0), None);
    }
}
