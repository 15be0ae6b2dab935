//! REST client
//!
//! Thin reqwest wrapper that knows the backend's base URL and resource paths.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use reqwest::RequestBuilder;

use crate::api::ResourceSource;
use crate::config::Config;
use crate::params::QueryParams;
use crate::error::Result;

/// Collections exposed by the back-office API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Properties,
    Clients,
    Contracts,
    Transactions,
}

impl Resource {
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Properties => "properties",
            Resource::Clients => "clients",
            Resource::Contracts => "contracts",
            Resource::Transactions => "transactions",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// == Api Client ==
/// HTTP client bound to one backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client with reqwest's default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// Creates a client using the configured base URL and timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;
        Ok(Self::with_http(http, &config.api_base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch source listing `resource`.
    pub fn source<T>(&self, resource: Resource) -> ResourceSource<T> {
        ResourceSource {
            client: self.clone(),
            resource,
            _record: PhantomData,
        }
    }

    // == List Request ==
    /// Builds the GET request listing `resource`.
    ///
    /// A `search` parameter is routed to `/{resource}/search?query=...`; all
    /// other parameters become query pairs.
    pub fn list_request(&self, resource: Resource, mut params: QueryParams) -> RequestBuilder {
        let mut pairs = Vec::new();
        let url = match params.remove("search") {
            Some(query) => {
                let query = match query {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                pairs.push(("query".to_string(), query));
                format!("{}/{}/search", self.base_url, resource.path())
            }
            None => format!("{}/{}", self.base_url, resource.path()),
        };
        pairs.extend(params.to_query_pairs());

        self.http.get(url).query(&pairs)
    }
}
