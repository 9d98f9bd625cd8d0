//! reqwest-backed implementation of [`AnalyticsBackend`].

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::wire::{self, RawDetailsResponse, RawInit, RawSummaryResponse, RawTimeseriesResponse};
use super::{AnalyticsBackend, AnalyticsModule, Endpoint};
use crate::config::Config;
use crate::error::{AnalyticsError, Result};
use crate::models::{AnalyticsQuery, DetailPage, InitData, SummaryViewModel, TimeseriesRow};
use crate::session::SessionProvider;

const JSON: &str = "application/json";

/// HTTP client for one analytics module.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    prefix: String,
    module: AnalyticsModule,
    timeout: Duration,
    session: Arc<dyn SessionProvider>,
}

impl HttpBackend {
    pub fn new(
        base_url: &str,
        prefix: &str,
        module: AnalyticsModule,
        timeout: Duration,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hospital-analytics/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AnalyticsError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            prefix: format!("/{}", prefix.trim_matches('/')),
            module,
            timeout,
            session,
        })
    }

    pub fn from_config(
        config: &Config,
        module: AnalyticsModule,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self> {
        Self::new(
            &config.api.base_url,
            module.prefix(&config.modules),
            module,
            config.request_timeout(),
            session,
        )
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}/{}", self.base_url, self.prefix, endpoint.path())
    }

    async fn send(&self, endpoint: Endpoint, body: Option<&AnalyticsQuery>) -> Result<Value> {
        let url = self.url(endpoint);
        let started = Instant::now();

        // `.json()` sets the content type for POST bodies itself.
        let mut request = match body {
            Some(query) => self.client.post(&url).json(query),
            None => self.client.get(&url).header(CONTENT_TYPE, JSON),
        };
        request = request.header(ACCEPT, JSON);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            let err = self.transport_error(&e);
            warn!(module = %self.module, %endpoint, error = %e, "Request failed");
            err
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(module = %self.module, %endpoint, status = status.as_u16(), "Backend returned error status");
            return Err(AnalyticsError::Http {
                status: status.as_u16(),
            });
        }

        let value = response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error()
            } else {
                AnalyticsError::Decode(e.to_string())
            }
        })?;

        debug!(
            module = %self.module,
            %endpoint,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request completed"
        );

        Ok(value)
    }

    fn transport_error(&self, err: &reqwest::Error) -> AnalyticsError {
        if err.is_timeout() {
            self.timeout_error()
        } else {
            AnalyticsError::Network(err.to_string())
        }
    }

    fn timeout_error(&self) -> AnalyticsError {
        AnalyticsError::Timeout {
            secs: self.timeout.as_secs().max(1),
        }
    }

    fn fallback(&self, endpoint: Endpoint) -> String {
        endpoint.fallback_message(self.module)
    }
}

#[async_trait]
impl AnalyticsBackend for HttpBackend {
    fn module(&self) -> AnalyticsModule {
        self.module
    }

    async fn init(&self) -> Result<InitData> {
        let body = self.send(Endpoint::Init, None).await?;
        let raw: RawInit = wire::decode(body, &self.fallback(Endpoint::Init))?;
        Ok(raw.into())
    }

    async fn summary(&self, query: &AnalyticsQuery) -> Result<SummaryViewModel> {
        let body = self.send(Endpoint::Summary, Some(query)).await?;
        let raw: RawSummaryResponse = wire::decode(body, &self.fallback(Endpoint::Summary))?;
        wire::normalize_summary(raw)
    }

    async fn details(&self, query: &AnalyticsQuery) -> Result<DetailPage> {
        let body = self.send(Endpoint::Details, Some(query)).await?;
        let raw: RawDetailsResponse = wire::decode(body, &self.fallback(Endpoint::Details))?;
        Ok(wire::normalize_details(raw))
    }

    async fn timeseries(&self, query: &AnalyticsQuery) -> Result<Vec<TimeseriesRow>> {
        let body = self.send(Endpoint::Timeseries, Some(query)).await?;
        let raw: RawTimeseriesResponse = wire::decode(body, &self.fallback(Endpoint::Timeseries))?;
        Ok(wire::normalize_timeseries(raw))
    }
}
