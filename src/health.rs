//! Liveness probe.
//!
//! `GET /health` answers `200 {"status":"healthy"}` whenever the process can
//! serve HTTP at all. It never touches the vendor API, so an upstream outage
//! does not get the pod restarted.

use serde::Serialize;

use crate::{Json, Request};

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

pub async fn liveness(_req: Request) -> Json<HealthStatus> {
    Json(HealthStatus { status: "healthy" })
}
