use super::ElasticClient;
use crate::error::{ElasticError, Result};
use crate::mapping::ElasticMapped;
use crate::outcome::Outcome;
use crate::response::GetResult;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

impl ElasticClient {
    /// Fetch one document by id.
    ///
    /// A missing document is a 404 outcome without payload, not an error.
    pub async fn get<T>(
        &self,
        id: &str,
        routing: Option<&str>,
        token: &CancellationToken,
    ) -> Result<Outcome<GetResult<T>>>
    where
        T: ElasticMapped + DeserializeOwned,
    {
        let mapping = self.mapping::<T>()?;
        let url = self.document_url(&mapping, id, routing);
        self.execute(Method::GET, url, None, token, |body| {
            Ok(serde_json::from_str(body)?)
        })
        .await
    }

    /// Like [`get`](Self::get), but anything without a document is an
    /// [`ElasticError::Engine`] carrying the description.
    pub async fn get_or_error<T>(
        &self,
        id: &str,
        routing: Option<&str>,
        token: &CancellationToken,
    ) -> Result<GetResult<T>>
    where
        T: ElasticMapped + DeserializeOwned,
    {
        let mut outcome = self.get::<T>(id, routing, token).await?;
        match outcome.payload.take() {
            Some(doc) => Ok(doc),
            None => Err(ElasticError::engine(
                format!(
                    "{}: {}",
                    outcome.status,
                    outcome.description.as_deref().unwrap_or("no document")
                ),
                &outcome,
            )),
        }
    }
}
