use crate::QueryArgs;
use anyhow::{Context, Result};
use futures::StreamExt;
use puppy_elastic::query::{Query, SimpleQueryStringQuery};
use puppy_elastic::{
    CancellationToken, ElasticClient, ScrollConfig, ScrollCursor, Search, SearchResult,
    SearchUrlParameters,
};
use serde_json::Value;

/// Turn the command-line query options into a search. No options means
/// `match_all`.
pub fn build_search(args: &QueryArgs) -> Result<Search> {
    let query = match (&args.query, &args.term) {
        (Some(text), _) => {
            let mut q = SimpleQueryStringQuery::new(text.as_str());
            if !args.fields.is_empty() {
                q = q.fields(args.fields.iter().cloned());
            }
            q.into()
        }
        (None, Some(term)) => {
            let (field, value) = term
                .split_once('=')
                .context("--term expects field=value")?;
            Query::term(field, value)
        }
        (None, None) => Query::match_all(),
    };
    Ok(Search::new().query(query))
}

fn print_hits(result: &SearchResult<Value>) -> Result<()> {
    for hit in &result.hits.hits {
        let line = serde_json::json!({
            "_id": hit.id,
            "_score": hit.score,
            "_source": hit.source,
        });
        println!("{}", serde_json::to_string(&line)?);
    }
    Ok(())
}

pub async fn search(
    client: &ElasticClient,
    search: &Search,
    routing: Option<String>,
    count: bool,
    token: &CancellationToken,
) -> Result<()> {
    let params = routing.map(|r| SearchUrlParameters::new().routing(r));
    let outcome = client.search::<Value>(search, params.as_ref(), token).await?;

    let Some(result) = outcome.payload else {
        anyhow::bail!(
            "Search failed: {} {}",
            outcome.status,
            outcome.description.unwrap_or_default()
        );
    };
    tracing::info!(
        "{} hits in {}ms, showing {}",
        result.hits.total,
        result.took,
        result.hits.hits.len()
    );
    print_hits(&result)?;

    if count {
        let counted = client.count::<Value>(search, token).await?;
        if let Some(n) = counted.payload {
            println!("count: {}", n);
        }
    }
    Ok(())
}

pub async fn scroll(
    client: &ElasticClient,
    search: Search,
    config: ScrollConfig,
    token: CancellationToken,
) -> Result<()> {
    let cursor = ScrollCursor::<Value>::new(client, search, config);
    let mut pages = Box::pin(cursor.into_stream(token));
    let mut total = 0usize;

    while let Some(page) = pages.next().await {
        let page = page?;
        total += page.hits.hits.len();
        print_hits(&page)?;
    }
    tracing::info!("Scrolled {} documents", total);
    Ok(())
}
