//! Typed Elasticsearch client
//!
//! Builds search requests from a typed query DSL, sends them to the engine
//! addressed through per-type index/document-type mappings, and maps the
//! responses back into typed results.
//!
//! # Operations
//!
//! - Existence checks: document, index, index + type, alias
//! - `get` by id (with optional routing)
//! - `search`, `search_exists`, `count`
//! - Scroll over large result sets
//!
//! Every operation returns an [`Outcome`] carrying status, request URL and
//! body, an optional description and the typed payload. A blocking facade
//! ([`BlockingClient`]) runs the same operations for synchronous callers.
//!
//! # Query DSL Support
//!
//! Supported query types:
//! - `match_all`, `match`, `simple_query_string`, `query_string`
//! - `term` / `terms` / `range` / `exists` / `prefix` / `wildcard` / `ids`
//! - `bool`, `constant_score`, `nested`
//! - `geo_distance`
//! - span queries: `span_term`, `span_first`, `span_near`, `span_or`,
//!   `span_not`, `span_multi`
//!
//! Supported aggregations:
//! - metrics: `avg` / `sum` / `min` / `max` / `stats` / `extended_stats` /
//!   `value_count` / `cardinality` / `percentiles`
//! - buckets: `terms`, `significant_terms`, `histogram`, `date_histogram`,
//!   `range`, `date_range`, `geo_distance`, `nested`, `reverse_nested`,
//!   `filter`, `filters`, `global`, `missing`

pub mod aggregation;
pub mod blocking;
pub mod client;
pub mod config;
pub mod error;
pub mod json;
pub mod mapping;
pub mod outcome;
pub mod query;
pub mod response;
pub mod scroll;
pub mod search;
pub mod units;

pub use blocking::{BlockingClient, SyncExecutor};
pub use client::ElasticClient;
pub use config::ClientConfig;
pub use error::{ElasticError, Result};
pub use json::Emit;
pub use mapping::{ElasticMapped, EntityMapping, MappingResolver};
pub use outcome::{Outcome, CLIENT_CLOSED_REQUEST};
pub use response::{GetResult, SearchResult, SubAggregations};
pub use scroll::{ScrollConfig, ScrollCursor};
pub use search::{Search, SearchUrlParameters};

pub use tokio_util::sync::CancellationToken;
