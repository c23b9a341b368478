use super::ElasticClient;
use crate::error::Result;
use crate::json::Emit;
use crate::mapping::ElasticMapped;
use crate::outcome::Outcome;
use crate::response::{CountResponse, ExistsResponse, SearchResult};
use crate::search::{render_params, Search, SearchUrlParameters};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

impl ElasticClient {
    /// POST `{base}/{index}/{type}/_search{params}`
    pub async fn search<T>(
        &self,
        search: &Search,
        params: Option<&SearchUrlParameters>,
        token: &CancellationToken,
    ) -> Result<Outcome<SearchResult<T>>>
    where
        T: ElasticMapped + DeserializeOwned,
    {
        let mapping = self.mapping::<T>()?;
        let url = format!(
            "{}/_search{}",
            self.type_url(&mapping),
            render_params(params)
        );
        self.execute(Method::POST, url, Some(search.to_json()), token, |body| {
            Ok(serde_json::from_str(body)?)
        })
        .await
    }

    /// Whether any document matches, without fetching hits.
    ///
    /// The engine answers 404 with `{"exists": false}` when nothing matches,
    /// which is reported as `false` like any other non-match.
    pub async fn search_exists<T: ElasticMapped>(
        &self,
        search: &Search,
        params: Option<&SearchUrlParameters>,
        token: &CancellationToken,
    ) -> Result<Outcome<bool>> {
        let mapping = self.mapping::<T>()?;
        let url = format!(
            "{}/_search/exists{}",
            self.type_url(&mapping),
            render_params(params)
        );
        let mut outcome = self
            .execute(Method::POST, url, Some(search.to_json()), token, |body| {
                let response: ExistsResponse = serde_json::from_str(body)?;
                Ok(response.exists)
            })
            .await?;
        outcome.payload.get_or_insert(false);
        Ok(outcome)
    }

    /// Number of documents matching the search query
    pub async fn count<T: ElasticMapped>(
        &self,
        search: &Search,
        token: &CancellationToken,
    ) -> Result<Outcome<u64>> {
        let mapping = self.mapping::<T>()?;
        let url = format!("{}/_count", self.type_url(&mapping));
        self.execute(Method::POST, url, Some(search.query_body()), token, |body| {
            let response: CountResponse = serde_json::from_str(body)?;
            Ok(response.count)
        })
        .await
    }
}
