use anyhow::Result;
use puppy_elastic::{CancellationToken, ElasticClient, Outcome};
use serde_json::Value;

/// Print an existence outcome as `true`/`false`, with the engine's
/// description when the check was not a clean hit
fn report_exists(outcome: &Outcome<bool>) {
    let exists = outcome.payload.unwrap_or(false);
    println!("{}", exists);
    if outcome.is_cancelled() {
        tracing::warn!("Cancelled before the engine answered");
    } else if !exists {
        tracing::info!(
            "{} -> {} {}",
            outcome.request_url,
            outcome.status,
            outcome.description.as_deref().unwrap_or("")
        );
    }
}

pub async fn index_exists(
    client: &ElasticClient,
    with_type: bool,
    token: &CancellationToken,
) -> Result<()> {
    let outcome = if with_type {
        client.index_type_exists::<Value>(token).await?
    } else {
        client.index_exists::<Value>(token).await?
    };
    report_exists(&outcome);
    Ok(())
}

pub async fn alias_exists(
    client: &ElasticClient,
    alias: &str,
    on_index: bool,
    token: &CancellationToken,
) -> Result<()> {
    let outcome = if on_index {
        client.alias_exists_for_index::<Value>(alias, token).await?
    } else {
        client.alias_exists(alias, token).await?
    };
    report_exists(&outcome);
    Ok(())
}

pub async fn get(
    client: &ElasticClient,
    id: &str,
    routing: Option<&str>,
    token: &CancellationToken,
) -> Result<()> {
    let outcome = client.get::<Value>(id, routing, token).await?;
    match outcome.payload {
        Some(doc) => {
            let source = doc.source.unwrap_or(Value::Null);
            println!("{}", serde_json::to_string_pretty(&source)?);
        }
        None => anyhow::bail!(
            "Document '{}' not available: {} {}",
            id,
            outcome.status,
            outcome.description.unwrap_or_default()
        ),
    }
    Ok(())
}
