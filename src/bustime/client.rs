use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use super::envelope::{unwrap_list, unwrap_str};
use super::error::UpstreamError;
use super::query::{Endpoint, PredictionQuery, VehicleQuery};
use super::{BusTracker, Record};
use crate::config::Config;

/// HTTP client for the Bus Tracker v2 API.
///
/// One `reqwest::Client` (and its connection pool) is shared by every clone
/// for the life of the process. Every request carries `key=<api key>` and
/// `format=json`. No timeout beyond reqwest's defaults, no retries.
#[derive(Clone)]
pub struct BusTimeClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl BusTimeClient {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        BusTimeClient {
            http: Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.base_url.clone(), config.api_key.clone())
    }

    /// Full URL for one call: base, endpoint segment, filters, then auth and
    /// format.
    pub(crate) fn request_url(&self, endpoint: Endpoint, params: &[(&'static str, String)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(endpoint.path());
        }
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .append_pair("key", &self.api_key)
            .append_pair("format", "json");
        url
    }

    async fn get_json(&self, url: Url) -> Result<Value, UpstreamError> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn fetch_list(
        &self,
        endpoint: Endpoint,
        params: &[(&'static str, String)],
    ) -> Result<Vec<Record>, UpstreamError> {
        debug!(endpoint = endpoint.path(), ?params, "vendor request");
        let url = self.request_url(endpoint, params);
        let result = match self.get_json(url).await {
            Ok(body) => unwrap_list(body, endpoint.key()),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            error!(endpoint = endpoint.path(), "vendor request failed: {e}");
        }
        result
    }
}

#[async_trait]
impl BusTracker for BusTimeClient {
    async fn time(&self) -> Result<String, UpstreamError> {
        let url = self.request_url(Endpoint::Time, &[]);
        let result = match self.get_json(url).await {
            Ok(body) => unwrap_str(body, Endpoint::Time.key()),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            error!(endpoint = Endpoint::Time.path(), "vendor request failed: {e}");
        }
        result
    }

    async fn vehicles(&self, query: &VehicleQuery) -> Result<Vec<Record>, UpstreamError> {
        self.fetch_list(Endpoint::Vehicles, &query.params()).await
    }

    async fn routes(&self) -> Result<Vec<Record>, UpstreamError> {
        self.fetch_list(Endpoint::Routes, &[]).await
    }

    async fn directions(&self, route_id: &str) -> Result<Vec<Record>, UpstreamError> {
        self.fetch_list(Endpoint::Directions, &[("rt", route_id.to_owned())]).await
    }

    async fn stops(&self, route_id: &str, direction: &str) -> Result<Vec<Record>, UpstreamError> {
        let params = [("rt", route_id.to_owned()), ("dir", direction.to_owned())];
        self.fetch_list(Endpoint::Stops, &params).await
    }

    async fn predictions(&self, query: &PredictionQuery) -> Result<Vec<Record>, UpstreamError> {
        self.fetch_list(Endpoint::Predictions, &query.params()).await
    }
}
