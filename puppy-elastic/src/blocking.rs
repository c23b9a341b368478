//! Synchronous facade over the async client
//!
//! [`SyncExecutor`] owns its own multi-thread runtime. A blocking call spawns
//! the operation there and parks the calling thread on a channel, so it
//! never re-enters the caller's runtime and is safe to use from inside a
//! tokio task. On timeout the operation's token is cancelled and the call
//! returns the operation's own cancelled outcome.

use crate::client::ElasticClient;
use crate::config::ClientConfig;
use crate::error::{ElasticError, Result};
use crate::mapping::{ElasticMapped, MappingResolver};
use crate::outcome::Outcome;
use crate::response::{GetResult, SearchResult};
use crate::scroll::{ScrollConfig, ScrollCursor};
use crate::search::{Search, SearchUrlParameters};
use futures::TryStreamExt;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};
use tokio_util::sync::CancellationToken;
use tracing::warn;

const WORKER_THREADS: usize = 2;

pub struct SyncExecutor {
    runtime: Option<Runtime>,
    timeout: Duration,
}

impl SyncExecutor {
    pub fn new(timeout: Duration) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(WORKER_THREADS)
            .thread_name("puppy-elastic-sync")
            .enable_all()
            .build()?;
        Ok(Self {
            runtime: Some(runtime),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn handle(&self) -> Result<&Handle> {
        self.runtime
            .as_ref()
            .map(Runtime::handle)
            .ok_or_else(|| ElasticError::Executor("runtime shut down".to_string()))
    }

    /// Run `op` to completion on the executor runtime and block until it
    /// finishes or the timeout passes.
    pub fn execute<F, Fut, T>(&self, op: F) -> Result<T>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let token = CancellationToken::new();
        let (tx, rx) = mpsc::channel();
        let fut = op(token.clone());

        self.handle()?.spawn(async move {
            // The receiver is gone only if the caller gave up entirely.
            let _ = tx.send(fut.await);
        });

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!("Blocking call exceeded {:?}, cancelling", self.timeout);
                token.cancel();
                rx.recv_timeout(self.timeout).map_err(|_| {
                    ElasticError::Executor("operation did not stop after cancellation".to_string())
                })?
            }
            Err(RecvTimeoutError::Disconnected) => Err(ElasticError::Executor(
                "operation ended without a result".to_string(),
            )),
        }
    }
}

impl Drop for SyncExecutor {
    fn drop(&mut self) {
        // A plain drop blocks, which panics inside an async context.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl std::fmt::Debug for SyncExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncExecutor")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Blocking counterpart of [`ElasticClient`].
///
/// Owns a dedicated client so pooled connections live on the executor
/// runtime.
#[derive(Debug)]
pub struct BlockingClient {
    client: ElasticClient,
    executor: SyncExecutor,
}

impl BlockingClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_resolver(config, MappingResolver::global())
    }

    pub fn with_resolver(config: ClientConfig, resolver: Arc<MappingResolver>) -> Result<Self> {
        let executor = SyncExecutor::new(config.sync_timeout())?;
        let client = ElasticClient::with_resolver(config, resolver)?;
        Ok(Self { client, executor })
    }

    pub fn client(&self) -> &ElasticClient {
        &self.client
    }

    pub fn exists_at(&self, url: &str) -> Result<Outcome<bool>> {
        let client = self.client.clone();
        let url = url.to_string();
        self.executor
            .execute(move |token| async move { client.exists_at(url, &token).await })
    }

    pub fn document_exists<T: ElasticMapped>(
        &self,
        id: &str,
        routing: Option<&str>,
    ) -> Result<Outcome<bool>> {
        let client = self.client.clone();
        let id = id.to_string();
        let routing = routing.map(str::to_string);
        self.executor.execute(move |token| async move {
            client
                .document_exists::<T>(&id, routing.as_deref(), &token)
                .await
        })
    }

    pub fn index_exists<T: ElasticMapped>(&self) -> Result<Outcome<bool>> {
        let client = self.client.clone();
        self.executor
            .execute(move |token| async move { client.index_exists::<T>(&token).await })
    }

    pub fn index_type_exists<T: ElasticMapped>(&self) -> Result<Outcome<bool>> {
        let client = self.client.clone();
        self.executor
            .execute(move |token| async move { client.index_type_exists::<T>(&token).await })
    }

    pub fn alias_exists_for_index<T: ElasticMapped>(&self, alias: &str) -> Result<Outcome<bool>> {
        let client = self.client.clone();
        let alias = alias.to_string();
        self.executor.execute(move |token| async move {
            client.alias_exists_for_index::<T>(&alias, &token).await
        })
    }

    pub fn alias_exists(&self, alias: &str) -> Result<Outcome<bool>> {
        let client = self.client.clone();
        let alias = alias.to_string();
        self.executor
            .execute(move |token| async move { client.alias_exists(&alias, &token).await })
    }

    pub fn get<T>(&self, id: &str, routing: Option<&str>) -> Result<Outcome<GetResult<T>>>
    where
        T: ElasticMapped + DeserializeOwned + Send,
    {
        let client = self.client.clone();
        let id = id.to_string();
        let routing = routing.map(str::to_string);
        self.executor.execute(move |token| async move {
            client.get::<T>(&id, routing.as_deref(), &token).await
        })
    }

    /// Synchronous get that turns 404/400 into [`ElasticError::Engine`]
    pub fn get_or_error<T>(&self, id: &str, routing: Option<&str>) -> Result<GetResult<T>>
    where
        T: ElasticMapped + DeserializeOwned + Send,
    {
        let client = self.client.clone();
        let id = id.to_string();
        let routing = routing.map(str::to_string);
        self.executor.execute(move |token| async move {
            client
                .get_or_error::<T>(&id, routing.as_deref(), &token)
                .await
        })
    }

    pub fn search<T>(
        &self,
        search: &Search,
        params: Option<&SearchUrlParameters>,
    ) -> Result<Outcome<SearchResult<T>>>
    where
        T: ElasticMapped + DeserializeOwned + Send,
    {
        let client = self.client.clone();
        let search = search.clone();
        let params = params.cloned();
        self.executor.execute(move |token| async move {
            client.search::<T>(&search, params.as_ref(), &token).await
        })
    }

    pub fn search_exists<T: ElasticMapped>(
        &self,
        search: &Search,
        params: Option<&SearchUrlParameters>,
    ) -> Result<Outcome<bool>> {
        let client = self.client.clone();
        let search = search.clone();
        let params = params.cloned();
        self.executor.execute(move |token| async move {
            client
                .search_exists::<T>(&search, params.as_ref(), &token)
                .await
        })
    }

    pub fn count<T: ElasticMapped>(&self, search: &Search) -> Result<Outcome<u64>> {
        let client = self.client.clone();
        let search = search.clone();
        self.executor
            .execute(move |token| async move { client.count::<T>(&search, &token).await })
    }

    /// Drain a scroll and return every non-empty page
    pub fn scroll_all<T>(&self, search: &Search, config: ScrollConfig) -> Result<Vec<SearchResult<T>>>
    where
        T: ElasticMapped + DeserializeOwned + Send,
    {
        let cursor = ScrollCursor::<T>::new(&self.client, search.clone(), config);
        self.executor.execute(move |token| async move {
            cursor.into_stream(token).try_collect::<Vec<_>>().await
        })
    }
}
