//! The browser-facing JSON API.
//!
//! | Route | Required | Success body |
//! |---|---|---|
//! | `GET /api/routes` | — | route list |
//! | `GET /api/vehicles` | `routes` (csv) | vehicle list |
//! | `GET /api/route/{route_id}` | path | `{"route_id", "directions": {dir: [stops]}}` |
//! | `GET /api/predictions` | `stop`, `route` | prediction list |
//! | `GET /api/time` | — | `{"tm": ...}` |
//! | `GET /health` | — | `{"status": "healthy"}` |
//!
//! Missing parameters answer `400` before any vendor call. Any vendor
//! failure answers `500 {"error": ...}`; the vendor envelope never reaches
//! the browser.

use std::sync::Arc;

use serde::Serialize;

use crate::bustime::{BusTracker, PredictionQuery, VehicleQuery};
use crate::health;
use crate::middleware::Cors;
use crate::request::Request;
use crate::response::{Json, Response};
use crate::router::Router;
use crate::status::Status;

/// Request handlers over a [`BusTracker`].
#[derive(Clone)]
pub struct Gateway {
    tracker: Arc<dyn BusTracker>,
}

#[derive(Serialize)]
struct ServerTime {
    tm: String,
}

impl Gateway {
    pub fn new(tracker: Arc<dyn BusTracker>) -> Self {
        Self { tracker }
    }

    pub async fn routes(&self, _req: Request) -> Response {
        match self.tracker.routes().await {
            Ok(routes) => Json(routes).with_status(Status::Ok),
            Err(_) => Response::error(Status::InternalServerError, "Failed to fetch routes"),
        }
    }

    pub async fn vehicles(&self, req: Request) -> Response {
        let route_ids: Vec<&str> = req
            .query("routes")
            .map(|csv| csv.split(',').map(str::trim).filter(|id| !id.is_empty()).collect())
            .unwrap_or_default();
        if route_ids.is_empty() {
            return Response::error(Status::BadRequest, "Route IDs are required");
        }

        match self.tracker.vehicles(&VehicleQuery::routes(route_ids)).await {
            Ok(vehicles) => Json(vehicles).with_status(Status::Ok),
            Err(_) => Response::error(Status::InternalServerError, "Failed to fetch vehicles"),
        }
    }

    pub async fn route_detail(&self, req: Request) -> Response {
        // The router only dispatches here when the segment matched.
        let route_id = req.param("route_id").unwrap_or_default();
        match self.tracker.route_info(route_id).await {
            Ok(info) => Json(info).with_status(Status::Ok),
            Err(_) => {
                Response::error(Status::InternalServerError, "Failed to fetch route directions")
            }
        }
    }

    pub async fn predictions(&self, req: Request) -> Response {
        let (Some(stop), Some(route)) = (req.query("stop"), req.query("route")) else {
            return Response::error(Status::BadRequest, "Stop ID and Route ID are required");
        };

        match self.tracker.predictions(&PredictionQuery::stop_on_route(stop, route)).await {
            Ok(predictions) => Json(predictions).with_status(Status::Ok),
            Err(_) => Response::error(Status::InternalServerError, "Failed to fetch predictions"),
        }
    }

    pub async fn time(&self, _req: Request) -> Response {
        match self.tracker.time().await {
            Ok(tm) => Json(ServerTime { tm }).with_status(Status::Ok),
            Err(_) => Response::error(Status::InternalServerError, "Failed to fetch server time"),
        }
    }
}

/// Wires every gateway endpoint, the liveness probe and CORS into a router.
pub fn router(gateway: Gateway, cors: Cors) -> Router {
    let gateway = Arc::new(gateway);

    // Each handler is a closure owning its own handle on the gateway.
    macro_rules! handler {
        ($method:ident) => {{
            let gateway = Arc::clone(&gateway);
            move |req: Request| {
                let gateway = Arc::clone(&gateway);
                async move { gateway.$method(req).await }
            }
        }};
    }

    Router::new()
        .get("/api/routes",           handler!(routes))
        .get("/api/vehicles",         handler!(vehicles))
        .get("/api/route/{route_id}", handler!(route_detail))
        .get("/api/predictions",      handler!(predictions))
        .get("/api/time",             handler!(time))
        .get("/health",               health::liveness)
        .cors(cors)
}
