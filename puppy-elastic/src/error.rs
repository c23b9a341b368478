//! Error types for the Elasticsearch client
//!
//! Expected protocol states (404, 400) are not errors: they are reported as
//! data in [`Outcome`](crate::outcome::Outcome). The variants here cover
//! caller misuse, engine-reported inconsistencies that must not be retried,
//! and transport failures.

use crate::outcome::Outcome;
use thiserror::Error;

/// Elasticsearch client errors
#[derive(Debug, Error)]
pub enum ElasticError {
    /// The engine reported a failure the caller has to act on
    /// (for example a child document addressed without its parent routing).
    #[error("Elastic error: {message} (request: {request_url})")]
    Engine {
        message: String,
        request_url: String,
        request_body: Option<String>,
    },

    #[error("No elastic mapping registered or declared for type: {0}")]
    MappingNotFound(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Scroll error: {0}")]
    Scroll(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Executor error: {0}")]
    Executor(String),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ElasticError>;

impl ElasticError {
    /// Short label for the error kind, used as a structured log field
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Engine { .. } => "engine",
            Self::MappingNotFound(_) => "mapping_not_found",
            Self::KeyNotFound(_) => "key_not_found",
            Self::Scroll(_) => "scroll",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Http(_) => "http",
            Self::Json(_) => "json",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Executor(_) => "executor",
        }
    }

    /// Whether the engine rejected the request because a routing value is required
    pub fn is_routing_missing(&self) -> bool {
        matches!(self, Self::Engine { message, .. } if message.contains(ROUTING_MISSING))
    }

    /// Engine failure for the request described by `outcome`
    pub(crate) fn engine<T>(message: impl Into<String>, outcome: &Outcome<T>) -> Self {
        Self::Engine {
            message: message.into(),
            request_url: outcome.request_url.clone(),
            request_body: outcome.request_body.clone(),
        }
    }
}

/// Marker the engine puts in 400 bodies when a child document is addressed
/// without its parent routing.
pub(crate) const ROUTING_MISSING: &str = "RoutingMissingException";

/// `outcome` already holds the 400 status; `engine_text` is the response body.
pub(crate) fn routing_missing<T>(outcome: &Outcome<T>, engine_text: &str) -> ElasticError {
    ElasticError::engine(
        format!(
            "{}: {}, add the parent id as routing if this is a child document: {}",
            outcome.status, ROUTING_MISSING, engine_text
        ),
        outcome,
    )
}

impl From<toml::de::Error> for ElasticError {
    fn from(err: toml::de::Error) -> Self {
        ElasticError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ElasticError {
    fn from(err: toml::ser::Error) -> Self {
        ElasticError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_missing_detection() {
        let mut outcome: Outcome<()> = Outcome::new(
            "http://localhost:9200/products/product/3",
            Some(r#"{"query":{"match_all":{}}}"#.to_string()),
        );
        outcome.status = reqwest::StatusCode::BAD_REQUEST;
        let err = routing_missing(&outcome, "RoutingMissingException[routing is required]");
        assert!(err.is_routing_missing());
        assert_eq!(err.error_type(), "engine");

        let ElasticError::Engine {
            message,
            request_url,
            request_body,
        } = &err
        else {
            panic!("expected an engine error");
        };
        assert!(message.starts_with("400 Bad Request"));
        assert!(message.contains("routing is required"));
        assert_eq!(request_url, "http://localhost:9200/products/product/3");
        assert_eq!(request_body.as_deref(), Some(r#"{"query":{"match_all":{}}}"#));
        assert!(err
            .to_string()
            .ends_with("(request: http://localhost:9200/products/product/3)"));

        let other = ElasticError::engine("shard failure", &outcome);
        assert!(!other.is_routing_missing());
    }

    #[test]
    fn test_display_messages() {
        let err = ElasticError::KeyNotFound("by_color".to_string());
        assert_eq!(err.to_string(), "Key not found: by_color");

        let err = ElasticError::MappingNotFound("app::Product".to_string());
        assert!(err.to_string().contains("app::Product"));
    }
}
