//! The vendor side: the CTA Bus Tracker API.
//!
//! [`BusTracker`] is the seam the gateway depends on. [`BusTimeClient`] is
//! the HTTP implementation; tests substitute their own.
//!
//! Records (routes, vehicles, stops, predictions) are opaque JSON values.
//! Nothing here reads their fields except `dir` on direction records, which
//! the route-detail composite needs to fan out.

mod client;
mod envelope;
mod error;
mod query;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

pub use client::BusTimeClient;
pub use envelope::{ENVELOPE_KEY, unwrap_list, unwrap_str};
pub use error::UpstreamError;
pub use query::{Endpoint, Params, PredictionQuery, VehicleQuery};

/// A vendor record passed through untouched.
pub type Record = Value;

/// Directions of one route with the stops served in each.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RouteInfo {
    pub route_id: String,
    /// Direction name (e.g. `"Northbound"`) to its stops, in vendor order.
    pub directions: IndexMap<String, Vec<Record>>,
    /// Directions whose stop lookup failed and were left out.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl RouteInfo {
    pub fn new(route_id: impl Into<String>) -> Self {
        Self { route_id: route_id.into(), ..Self::default() }
    }
}

/// Logical operations against the vendor API.
#[async_trait]
pub trait BusTracker: Send + Sync {
    /// Vendor server time, e.g. `"20240101 12:00:00"`.
    async fn time(&self) -> Result<String, UpstreamError>;

    async fn vehicles(&self, query: &VehicleQuery) -> Result<Vec<Record>, UpstreamError>;

    async fn routes(&self) -> Result<Vec<Record>, UpstreamError>;

    async fn directions(&self, route_id: &str) -> Result<Vec<Record>, UpstreamError>;

    async fn stops(&self, route_id: &str, direction: &str) -> Result<Vec<Record>, UpstreamError>;

    async fn predictions(&self, query: &PredictionQuery) -> Result<Vec<Record>, UpstreamError>;

    /// Directions of `route_id`, then the stops of each, one call at a time.
    ///
    /// Fails if the directions call fails or returns nothing. A direction
    /// whose stops call fails is left out and named in
    /// [`RouteInfo::skipped`]; direction records without a `dir` field are
    /// ignored.
    async fn route_info(&self, route_id: &str) -> Result<RouteInfo, UpstreamError> {
        let directions = self.directions(route_id).await?;
        if directions.is_empty() {
            warn!(route_id, "no directions returned");
            return Err(UpstreamError::NoDirections(route_id.to_owned()));
        }

        let mut info = RouteInfo::new(route_id);
        for record in &directions {
            let Some(dir) = record.get("dir").and_then(Value::as_str) else {
                continue;
            };
            match self.stops(route_id, dir).await {
                Ok(stops) => {
                    info.directions.insert(dir.to_owned(), stops);
                }
                // The client has already logged why.
                Err(_) => info.skipped.push(dir.to_owned()),
            }
        }
        Ok(info)
    }
}
