//! Scroll cursor over large result sets
//!
//! A cursor starts Unopened. [`ScrollCursor::open`] runs the initial search
//! and moves it to Open with the returned scroll id; every
//! [`ScrollCursor::next_page`] continues with the latest id and replaces it
//! with the one in the response. An empty page means the scroll is drained.
//!
//! In scan mode the opening search only sets up the scroll and returns no
//! hits; documents arrive from the first continuation on.

use crate::client::ElasticClient;
use crate::config::ScrollSettings;
use crate::error::{ElasticError, Result};
use crate::json::Emit;
use crate::mapping::ElasticMapped;
use crate::outcome::Outcome;
use crate::response::SearchResult;
use crate::search::{Search, SearchType};
use crate::units::TimeUnit;
use futures::Stream;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Keep-alive and page size of a scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollConfig {
    lifetime: TimeUnit,
    size: u32,
    scan: bool,
}

impl ScrollConfig {
    pub fn new(lifetime: TimeUnit, size: u32) -> Self {
        Self {
            lifetime,
            size,
            scan: false,
        }
    }

    pub fn from_settings(settings: &ScrollSettings) -> Result<Self> {
        Ok(Self::new(settings.lifetime()?, settings.size).scan(settings.scan))
    }

    /// Open with `search_type=scan`. The engine applies `size` per shard.
    pub fn scan(mut self, scan: bool) -> Self {
        self.scan = scan;
        self
    }

    pub fn is_scan(&self) -> bool {
        self.scan
    }

    pub fn lifetime(&self) -> TimeUnit {
        self.lifetime
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Query string for the initial search
    pub fn setup_params(&self) -> String {
        if self.scan {
            format!(
                "?search_type={}&scroll={}&size={}",
                SearchType::Scan.as_str(),
                self.lifetime,
                self.size
            )
        } else {
            format!("?scroll={}&size={}", self.lifetime, self.size)
        }
    }

    /// Path prefix for continuation requests; the scroll id is appended
    pub fn scroll_base(&self) -> String {
        format!("_search/scroll?scroll={}&scroll_id=", self.lifetime)
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self::new(TimeUnit::Minutes(1), 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollState {
    Unopened,
    Open { scroll_id: String },
}

/// One scroll over documents of type `T`.
///
/// Methods take `&mut self`, so a cursor is driven by one caller at a time.
#[derive(Debug)]
pub struct ScrollCursor<T> {
    client: ElasticClient,
    search: Search,
    config: ScrollConfig,
    state: ScrollState,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ScrollCursor<T>
where
    T: ElasticMapped + DeserializeOwned,
{
    pub fn new(client: &ElasticClient, search: Search, config: ScrollConfig) -> Self {
        Self {
            client: client.clone(),
            search,
            config,
            state: ScrollState::Unopened,
            _marker: PhantomData,
        }
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    pub fn scroll_id(&self) -> Option<&str> {
        match &self.state {
            ScrollState::Open { scroll_id } => Some(scroll_id),
            ScrollState::Unopened => None,
        }
    }

    /// Run the initial search: `{base}/{index}/{type}/_search?scroll=..&size=..`,
    /// led by `search_type=scan` in scan mode
    pub async fn open(&mut self, token: &CancellationToken) -> Result<Outcome<SearchResult<T>>> {
        let mapping = self.client.mapping::<T>()?;
        let url = format!(
            "{}/_search{}",
            self.client.type_url(&mapping),
            self.config.setup_params()
        );
        let outcome = self
            .client
            .execute(
                Method::POST,
                url,
                Some(self.search.to_json()),
                token,
                |body| Ok(serde_json::from_str::<SearchResult<T>>(body)?),
            )
            .await?;

        if let Some(result) = &outcome.payload {
            let scroll_id = result.scroll_id.clone().ok_or_else(|| {
                ElasticError::Scroll("search response carried no _scroll_id".to_string())
            })?;
            debug!("Scroll opened, {} hits total", result.hits.total);
            self.state = ScrollState::Open { scroll_id };
        }
        Ok(outcome)
    }

    /// Fetch the next page: `{base}/_search/scroll?scroll=..&scroll_id={id}`
    pub async fn next_page(
        &mut self,
        token: &CancellationToken,
    ) -> Result<Outcome<SearchResult<T>>> {
        let scroll_id = match &self.state {
            ScrollState::Open { scroll_id } => scroll_id.clone(),
            ScrollState::Unopened => {
                return Err(ElasticError::Scroll(
                    "next_page called before open".to_string(),
                ))
            }
        };

        // Scroll ids are base64 and may carry '+', '/' or '='.
        let url = format!(
            "{}/{}{}",
            self.client.base_url(),
            self.config.scroll_base(),
            url::form_urlencoded::byte_serialize(scroll_id.as_bytes()).collect::<String>()
        );
        let outcome = self
            .client
            .execute(Method::POST, url, None, token, |body| {
                Ok(serde_json::from_str::<SearchResult<T>>(body)?)
            })
            .await?;

        if let Some(result) = &outcome.payload {
            let next_id = result.scroll_id.clone().ok_or_else(|| {
                ElasticError::Scroll("scroll page carried no _scroll_id".to_string())
            })?;
            self.state = ScrollState::Open { scroll_id: next_id };
        }
        Ok(outcome)
    }

    /// Stream every non-empty page, opening the scroll first if needed.
    ///
    /// The stream ends at the first empty page or on cancellation. Any other
    /// outcome without a payload is an [`ElasticError::Scroll`]. The hitless
    /// opening page of a scan is skipped rather than ending the stream.
    pub fn into_stream(self, token: CancellationToken) -> impl Stream<Item = Result<SearchResult<T>>> {
        let mut cursor = self;
        async_stream::try_stream! {
            let mut opened = matches!(cursor.state, ScrollState::Open { .. });
            loop {
                let opening = !opened;
                let outcome = if opened {
                    cursor.next_page(&token).await?
                } else {
                    opened = true;
                    cursor.open(&token).await?
                };

                if outcome.is_cancelled() {
                    debug!("Scroll stream cancelled");
                    break;
                }
                let page = page_or_error(outcome)?;
                if page.is_empty() {
                    if opening && cursor.config.is_scan() {
                        continue;
                    }
                    break;
                }
                yield page;
            }
        }
    }
}

fn page_or_error<T>(outcome: Outcome<SearchResult<T>>) -> Result<SearchResult<T>> {
    let status = outcome.status;
    let description = outcome.description.clone();
    outcome.into_payload().ok_or_else(|| {
        ElasticError::Scroll(format!(
            "{}: {}",
            status,
            description.unwrap_or_default()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_urls() {
        let config = ScrollConfig::new(TimeUnit::Minutes(1), 100);
        assert_eq!(config.setup_params(), "?scroll=1m&size=100");
        assert_eq!(config.scroll_base(), "_search/scroll?scroll=1m&scroll_id=");
    }

    #[test]
    fn test_scan_setup_params() {
        let config = ScrollConfig::new(TimeUnit::Seconds(30), 5).scan(true);
        assert!(config.is_scan());
        assert_eq!(config.setup_params(), "?search_type=scan&scroll=30s&size=5");
        assert_eq!(config.scroll_base(), "_search/scroll?scroll=30s&scroll_id=");
    }

    #[test]
    fn test_config_from_settings() {
        let settings = ScrollSettings {
            lifetime: "30s".to_string(),
            size: 25,
            scan: true,
        };
        let config = ScrollConfig::from_settings(&settings).unwrap();
        assert_eq!(config.lifetime(), TimeUnit::Seconds(30));
        assert_eq!(config.size(), 25);
        assert!(config.is_scan());
    }

    #[tokio::test]
    async fn test_next_page_before_open_fails() {
        use crate::config::ClientConfig;
        use crate::mapping::MappingResolver;
        use std::sync::Arc;

        let client = ElasticClient::with_resolver(
            ClientConfig::default(),
            Arc::new(MappingResolver::new()),
        )
        .unwrap();
        let mut cursor: ScrollCursor<serde_json::Value> =
            ScrollCursor::new(&client, Search::new(), ScrollConfig::default());
        assert_eq!(cursor.state(), &ScrollState::Unopened);

        let err = cursor.next_page(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, ElasticError::Scroll(_)));
    }
}
