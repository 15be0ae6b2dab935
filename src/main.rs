//! Estate Data - command-line loader
//!
//! Loads one back-office collection page by page through the paged data
//! controller and prints a JSON summary of the result.
//!
//! Usage: `estate_data [properties|clients|contracts|transactions]`

use std::time::Duration;

use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use estate_data::api::{ApiClient, Resource};
use estate_data::models::{Client, Contract, Property, Transaction};
use estate_data::{
    shared_cache, spawn_cleanup_task, Config, PagedDataController, QueryParams, RecordId,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "estate_data=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let resource = match std::env::args().nth(1).as_deref() {
        None | Some("properties") => Resource::Properties,
        Some("clients") => Resource::Clients,
        Some("contracts") => Resource::Contracts,
        Some("transactions") => Resource::Transactions,
        Some(other) => bail!("unknown resource '{}'", other),
    };

    let config = Config::from_env();
    info!(
        "Configuration loaded: base_url={}, page_size={}, max_pages={}, cleanup_interval={}s",
        config.api_base_url,
        config.controller.page_size,
        config.max_pages,
        config.cleanup_interval
    );

    let client = ApiClient::from_config(&config).context("failed to build HTTP client")?;

    let summary = match resource {
        Resource::Properties => {
            load::<Property>(&client, resource, Property::record_id, &config).await
        }
        Resource::Clients => load::<Client>(&client, resource, Client::record_id, &config).await,
        Resource::Contracts => {
            load::<Contract>(&client, resource, Contract::record_id, &config).await
        }
        Resource::Transactions => {
            load::<Transaction>(&client, resource, Transaction::record_id, &config).await
        }
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Loads up to `max_pages` pages of `resource` and summarizes the outcome.
async fn load<T>(
    client: &ApiClient,
    resource: Resource,
    identity: fn(&T) -> RecordId,
    config: &Config,
) -> Value
where
    T: Clone + Send + Sync + DeserializeOwned + 'static,
{
    let options = config.controller.clone().with_cache_key(resource.path());
    let cache = shared_cache::<Vec<T>>(options.cache_ttl);
    let sweep = (config.cleanup_interval > 0).then(|| {
        spawn_cleanup_task(cache.clone(), Duration::from_secs(config.cleanup_interval))
    });

    let controller = PagedDataController::new(
        client.source::<T>(resource),
        identity,
        cache.clone(),
        options,
    );

    controller.fetch_page(1, QueryParams::new()).await;
    let mut pages = 1;
    while pages < config.max_pages && controller.load_more().await > 0 {
        pages += 1;
    }

    let state = controller.state();
    match &state.error {
        Some(error) => warn!(%resource, %error, "load finished with an error"),
        None => info!(%resource, records = state.data.len(), "load finished"),
    }

    if let Some(sweep) = sweep {
        sweep.abort();
    }

    json!({
        "resource": resource.path(),
        "records": state.data.len(),
        "pages": state.current_page,
        "has_more": state.has_more,
        "error": state.error,
        "cache": cache.read().await.stats(),
    })
}
