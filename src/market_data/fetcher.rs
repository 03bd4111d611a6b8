use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::metrics::prometheus::{record_fetch, record_fetch_latency};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(StatusCode),
    #[error("response did not have the expected shape")]
    Shape,
}

impl FetchError {
    /// Short label for the `outcome` metric dimension.
    fn outcome(&self) -> &'static str {
        match self {
            FetchError::Transport(err) if err.is_timeout() => "timeout",
            FetchError::Transport(err) if err.is_decode() => "decode",
            FetchError::Transport(_) => "transport",
            FetchError::Status(_) => "status",
            FetchError::Shape => "shape",
        }
    }
}

/// `{ "data": ... }` wrapper shared by the upstream APIs.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// One outbound GET: where to send it and what to attach.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub source: &'static str,
    pub url: String,
    pub query: Vec<(&'static str, String)>,
    pub headers: Vec<(&'static str, String)>,
}

impl Endpoint {
    pub fn get(source: &'static str, url: impl Into<String>) -> Self {
        Self {
            source,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// Joins a base URL and a path without doubling the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Best-effort JSON fetcher. Every failure is logged and turned into `None`;
/// nothing is retried within a call.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// GETs `endpoint`, decodes the body as `T` and maps it through `adapt`.
    /// An adapter returning `None` is reported as a shape error.
    pub async fn fetch<T, O, F>(&self, endpoint: &Endpoint, adapt: F) -> Option<O>
    where
        T: DeserializeOwned,
        F: FnOnce(T) -> Option<O>,
    {
        let started = Instant::now();
        let result = self
            .fetch_json::<T>(endpoint)
            .await
            .and_then(|raw| adapt(raw).ok_or(FetchError::Shape));

        record_fetch_latency(endpoint.source, started.elapsed().as_secs_f64() * 1_000.0);

        match result {
            Ok(value) => {
                record_fetch(endpoint.source, "ok");
                debug!(source = endpoint.source, "fetch succeeded");
                Some(value)
            }
            Err(err) => {
                record_fetch(endpoint.source, err.outcome());
                warn!(source = endpoint.source, error = %err, "fetch failed, falling back");
                None
            }
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T, FetchError> {
        let mut request = self.client.get(&endpoint.url).query(&endpoint.query);
        for (name, value) in &endpoint.headers {
            request = request.header(*name, value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        Ok(response.json::<T>().await?)
    }
}
