//! Async Elasticsearch client
//!
//! Every operation takes a [`CancellationToken`] and returns an
//! [`Outcome`]. The envelope is created with the request URL and body before
//! anything is sent, then filled in from the response.

mod exists;
mod get;
mod search;

use crate::config::ClientConfig;
use crate::error::{routing_missing, Result, ROUTING_MISSING};
use crate::mapping::{ElasticMapped, EntityMapping, MappingResolver};
use crate::outcome::Outcome;
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Cheaply cloneable client; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ElasticClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    resolver: Arc<MappingResolver>,
}

/// Status and body of a completed HTTP exchange
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ElasticClient {
    /// Client using the process-wide mapping resolver
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_resolver(config, MappingResolver::global())
    }

    pub fn with_resolver(config: ClientConfig, resolver: Arc<MappingResolver>) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;

        debug!("Elastic client for {}", config.base_url());
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                resolver,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        self.inner.config.base_url()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn resolver(&self) -> &Arc<MappingResolver> {
        &self.inner.resolver
    }

    pub(crate) fn mapping<T: ElasticMapped>(&self) -> Result<Arc<EntityMapping>> {
        self.inner.resolver.resolve::<T>()
    }

    /// `{base}/{index}/{type}`
    pub(crate) fn type_url(&self, mapping: &EntityMapping) -> String {
        format!(
            "{}/{}/{}",
            self.base_url(),
            mapping.index(),
            mapping.doc_type()
        )
    }

    /// `{base}/{index}/{type}/{id}` plus `?routing=` when given
    pub(crate) fn document_url(
        &self,
        mapping: &EntityMapping,
        id: &str,
        routing: Option<&str>,
    ) -> String {
        let mut url = format!("{}/{}", self.type_url(mapping), id);
        if let Some(routing) = routing {
            url.push_str("?routing=");
            url.extend(url::form_urlencoded::byte_serialize(routing.as_bytes()));
        }
        url
    }

    /// Send one request. `Ok(None)` means the token fired first.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
        token: &CancellationToken,
    ) -> Result<Option<RawResponse>> {
        if token.is_cancelled() {
            return Ok(None);
        }

        trace!("{} {} body={}", method, url, body.unwrap_or(""));
        let mut request = self.inner.http.request(method, url);
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }
        if let Some(username) = &self.inner.config.username {
            request = request.basic_auth(username, self.inner.config.password.as_ref());
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, crate::error::ElasticError>(RawResponse { status, body })
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => Ok(None),
            raw = exchange => raw.map(Some),
        }
    }

    /// Run a request and map the response into an envelope.
    ///
    /// 200 bodies go through `on_success`; a body it cannot decode leaves the
    /// status in place and the decode error in the description. 404 and 400
    /// keep a description and no payload; a 400 carrying
    /// `RoutingMissingException` is an error. Other statuses, other 2xx
    /// included, keep the status and reason phrase only.
    pub(crate) async fn execute<T>(
        &self,
        method: Method,
        url: String,
        body: Option<String>,
        token: &CancellationToken,
        on_success: impl FnOnce(&str) -> Result<T>,
    ) -> Result<Outcome<T>> {
        let mut outcome = Outcome::new(url, body);

        let sent = self
            .send(
                method,
                &outcome.request_url,
                outcome.request_body.as_deref(),
                token,
            )
            .await?;
        let raw = match sent {
            Some(raw) => raw,
            None => {
                debug!("Request cancelled: {}", outcome.request_url);
                return Ok(outcome.cancelled());
            }
        };

        outcome.status = raw.status;
        match raw.status {
            StatusCode::OK => match on_success(&raw.body) {
                Ok(payload) => outcome.payload = Some(payload),
                Err(err) => {
                    warn!("Undecodable response from {}: {}", outcome.request_url, err);
                    outcome.description = Some(format!("undecodable response body: {}", err));
                }
            },
            StatusCode::BAD_REQUEST => {
                if raw.body.contains(ROUTING_MISSING) {
                    warn!("Routing missing for {}", outcome.request_url);
                    return Err(routing_missing(&outcome, &raw.body));
                }
                warn!("Bad request {}: {}", outcome.request_url, raw.body);
                outcome.description = Some(describe(&raw));
            }
            StatusCode::NOT_FOUND => {
                debug!("Not found: {}", outcome.request_url);
                outcome.description = Some(describe(&raw));
            }
            status => {
                warn!("Unexpected status {} for {}", status, outcome.request_url);
                outcome.description = status.canonical_reason().map(str::to_string);
            }
        }

        Ok(outcome)
    }
}

/// Engine text when there is any, reason phrase otherwise
fn describe(raw: &RawResponse) -> String {
    if raw.body.trim().is_empty() {
        raw.status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        raw.body.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ElasticClient {
        ElasticClient::with_resolver(
            ClientConfig::with_url("http://localhost:9200/"),
            Arc::new(MappingResolver::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_url_shapes() {
        let client = client();
        let mapping = EntityMapping::new("products", "product");
        assert_eq!(client.base_url(), "http://localhost:9200");
        assert_eq!(
            client.type_url(&mapping),
            "http://localhost:9200/products/product"
        );
        assert_eq!(
            client.document_url(&mapping, "42", None),
            "http://localhost:9200/products/product/42"
        );
        assert_eq!(
            client.document_url(&mapping, "42", Some("parent 7")),
            "http://localhost:9200/products/product/42?routing=parent+7"
        );
    }

    #[test]
    fn test_describe_prefers_body() {
        let raw = RawResponse {
            status: StatusCode::NOT_FOUND,
            body: String::new(),
        };
        assert_eq!(describe(&raw), "Not Found");

        let raw = RawResponse {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"error":"SearchPhaseExecutionException"}"#.to_string(),
        };
        assert!(describe(&raw).contains("SearchPhaseExecutionException"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = ElasticClient::with_resolver(
            ClientConfig::with_url("::nope"),
            Arc::new(MappingResolver::new()),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_sends_nothing() {
        let client = client();
        let token = CancellationToken::new();
        token.cancel();
        let outcome = client
            .execute(
                Method::GET,
                "http://localhost:1/never".to_string(),
                None,
                &token,
                |_| Ok(()),
            )
            .await
            .unwrap();
        assert!(outcome.is_cancelled());
        assert!(outcome.payload.is_none());
    }
}
