//! Existence checks (HEAD)
//!
//! 200 reports `true`; 404, 400 and any other status report `false`. A
//! cancelled check also reports `false`, with the cancelled status.

use super::ElasticClient;
use crate::error::Result;
use crate::mapping::ElasticMapped;
use crate::outcome::Outcome;
use reqwest::Method;
use tokio_util::sync::CancellationToken;

impl ElasticClient {
    /// HEAD an arbitrary URL
    pub async fn exists_at(
        &self,
        url: impl Into<String>,
        token: &CancellationToken,
    ) -> Result<Outcome<bool>> {
        let mut outcome = self
            .execute(Method::HEAD, url.into(), None, token, |_| Ok(true))
            .await?;
        outcome.payload.get_or_insert(false);
        Ok(outcome)
    }

    /// `{base}/{index}/{type}/{id}`, with `?routing=` for child documents
    pub async fn document_exists<T: ElasticMapped>(
        &self,
        id: &str,
        routing: Option<&str>,
        token: &CancellationToken,
    ) -> Result<Outcome<bool>> {
        let mapping = self.mapping::<T>()?;
        let url = self.document_url(&mapping, id, routing);
        self.exists_at(url, token).await
    }

    /// `{base}/{index}`
    pub async fn index_exists<T: ElasticMapped>(
        &self,
        token: &CancellationToken,
    ) -> Result<Outcome<bool>> {
        let mapping = self.mapping::<T>()?;
        let url = format!("{}/{}", self.base_url(), mapping.index());
        self.exists_at(url, token).await
    }

    /// `{base}/{index}/{type}`
    pub async fn index_type_exists<T: ElasticMapped>(
        &self,
        token: &CancellationToken,
    ) -> Result<Outcome<bool>> {
        let mapping = self.mapping::<T>()?;
        let url = self.type_url(&mapping);
        self.exists_at(url, token).await
    }

    /// `{base}/{index}/_alias/{alias}`
    pub async fn alias_exists_for_index<T: ElasticMapped>(
        &self,
        alias: &str,
        token: &CancellationToken,
    ) -> Result<Outcome<bool>> {
        let mapping = self.mapping::<T>()?;
        let url = format!("{}/{}/_alias/{}", self.base_url(), mapping.index(), alias);
        self.exists_at(url, token).await
    }

    /// `{base}/_alias/{alias}`, across all indices
    pub async fn alias_exists(
        &self,
        alias: &str,
        token: &CancellationToken,
    ) -> Result<Outcome<bool>> {
        let url = format!("{}/_alias/{}", self.base_url(), alias);
        self.exists_at(url, token).await
    }
}
