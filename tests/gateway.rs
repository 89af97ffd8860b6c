//! Gateway endpoints against an in-memory tracker.
//!
//! Every request goes through the real router (CORS, 404/405, panic
//! capture); only the vendor side is faked.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use bustrack::bustime::{PredictionQuery, Record, VehicleQuery};
use bustrack::middleware::Cors;
use bustrack::{BusTracker, Gateway, Router, UpstreamError, gateway};
use http::StatusCode;
use serde_json::{Value, json};

// ============================================================================
// Test Fixtures
// ============================================================================

/// `None` anywhere below means "the vendor call fails".
#[derive(Default)]
struct FakeTracker {
    time: Option<String>,
    routes: Option<Vec<Record>>,
    vehicles: Option<Vec<Record>>,
    directions: Option<Vec<Record>>,
    stops: HashMap<String, Option<Vec<Record>>>,
    predictions: Option<Vec<Record>>,
    panic_on_routes: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeTracker {
    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn answer(data: &Option<Vec<Record>>) -> Result<Vec<Record>, UpstreamError> {
    data.clone().ok_or(UpstreamError::MissingEnvelope)
}

#[async_trait]
impl BusTracker for FakeTracker {
    async fn time(&self) -> Result<String, UpstreamError> {
        self.log("time".into());
        self.time.clone().ok_or(UpstreamError::MissingField("tm"))
    }

    async fn vehicles(&self, query: &VehicleQuery) -> Result<Vec<Record>, UpstreamError> {
        self.log(format!("vehicles {}", query.route_ids.join(",")));
        answer(&self.vehicles)
    }

    async fn routes(&self) -> Result<Vec<Record>, UpstreamError> {
        self.log("routes".into());
        if self.panic_on_routes {
            panic!("route table corrupted");
        }
        answer(&self.routes)
    }

    async fn directions(&self, route_id: &str) -> Result<Vec<Record>, UpstreamError> {
        self.log(format!("directions {route_id}"));
        answer(&self.directions)
    }

    async fn stops(&self, route_id: &str, direction: &str) -> Result<Vec<Record>, UpstreamError> {
        self.log(format!("stops {route_id} {direction}"));
        self.stops
            .get(direction)
            .map(answer)
            .unwrap_or(Err(UpstreamError::MissingEnvelope))
    }

    async fn predictions(&self, query: &PredictionQuery) -> Result<Vec<Record>, UpstreamError> {
        self.log(format!(
            "predictions {} {}",
            query.stop_id.as_deref().unwrap_or("-"),
            query.route_id.as_deref().unwrap_or("-")
        ));
        answer(&self.predictions)
    }
}

fn app(tracker: Arc<FakeTracker>) -> Router {
    gateway::router(
        Gateway::new(tracker),
        Cors::new(vec!["http://localhost:8000".into()]),
    )
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let req = http::Request::builder().uri(uri).body(Bytes::new()).unwrap();
    let res = router.respond(req).await;
    let body = if res.body().is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(res.body()).unwrap()
    };
    (res.status_code(), body)
}

fn clark_directions() -> Vec<Record> {
    vec![json!({ "dir": "Northbound" }), json!({ "dir": "Southbound" })]
}

// ============================================================================
// Routes
// ============================================================================

#[tokio::test]
async fn test_routes_returns_unwrapped_list_in_vendor_order() {
    let routes = vec![
        json!({ "rt": "9", "rtnm": "Ashland", "rtclr": "#ff0000" }),
        json!({ "rt": "22", "rtnm": "Clark", "rtclr": "#0000ff" }),
    ];
    let tracker = Arc::new(FakeTracker { routes: Some(routes.clone()), ..Default::default() });
    let router = app(tracker);

    let (status, body) = get(&router, "/api/routes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(routes));
}

#[tokio::test]
async fn test_routes_upstream_failure_is_500() {
    let router = app(Arc::new(FakeTracker::default()));
    let (status, body) = get(&router, "/api/routes").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch routes" }));
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let tracker = Arc::new(FakeTracker {
        routes: Some(vec![json!({ "rt": "22" }), json!({ "rt": "4" })]),
        ..Default::default()
    });
    let router = app(tracker);

    let first = get(&router, "/api/routes").await;
    let second = get(&router, "/api/routes").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_local_fault_is_500_with_message() {
    let tracker = Arc::new(FakeTracker { panic_on_routes: true, ..Default::default() });
    let router = app(tracker);

    let (status, body) = get(&router, "/api/routes").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "route table corrupted" }));
}

// ============================================================================
// Vehicles
// ============================================================================

#[tokio::test]
async fn test_vehicles_without_routes_is_400_and_skips_vendor() {
    let tracker = Arc::new(FakeTracker { vehicles: Some(vec![]), ..Default::default() });
    let router = app(Arc::clone(&tracker));

    for uri in [
        "/api/vehicles",
        "/api/vehicles?routes=",
        "/api/vehicles?route=22",
        "/api/vehicles?vid=1234&stop=1001",
        "/api/vehicles?routes=,,",
    ] {
        let (status, body) = get(&router, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, json!({ "error": "Route IDs are required" }));
    }
    assert!(tracker.calls().is_empty());
}

#[tokio::test]
async fn test_vehicles_splits_route_list() {
    let vehicles = vec![json!({ "vid": "1234", "rt": "22", "lat": "41.9", "lon": "-87.6" })];
    let tracker = Arc::new(FakeTracker { vehicles: Some(vehicles.clone()), ..Default::default() });
    let router = app(Arc::clone(&tracker));

    let (status, body) = get(&router, "/api/vehicles?routes=22,36").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(vehicles));
    assert_eq!(tracker.calls(), vec!["vehicles 22,36"]);
}

#[tokio::test]
async fn test_vehicles_upstream_failure_is_500() {
    let router = app(Arc::new(FakeTracker::default()));
    let (status, body) = get(&router, "/api/vehicles?routes=22").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch vehicles" }));
}

// ============================================================================
// Route detail
// ============================================================================

#[tokio::test]
async fn test_route_detail_maps_each_direction_to_its_stops() {
    let north = vec![json!({ "stpid": "1", "stpnm": "Clark & Howard" })];
    let south = vec![json!({ "stpid": "2", "stpnm": "Clark & Harrison" })];
    let tracker = Arc::new(FakeTracker {
        directions: Some(clark_directions()),
        stops: HashMap::from([
            ("Northbound".to_owned(), Some(north.clone())),
            ("Southbound".to_owned(), Some(south.clone())),
        ]),
        ..Default::default()
    });
    let router = app(Arc::clone(&tracker));

    let (status, body) = get(&router, "/api/route/22").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "route_id": "22",
            "directions": { "Northbound": north, "Southbound": south },
        })
    );
    assert_eq!(
        tracker.calls(),
        vec!["directions 22", "stops 22 Northbound", "stops 22 Southbound"]
    );
}

#[tokio::test]
async fn test_route_detail_omits_direction_whose_stops_fail() {
    let south = vec![json!({ "stpid": "2" })];
    let tracker = Arc::new(FakeTracker {
        directions: Some(clark_directions()),
        stops: HashMap::from([
            ("Northbound".to_owned(), None),
            ("Southbound".to_owned(), Some(south.clone())),
        ]),
        ..Default::default()
    });
    let router = app(tracker);

    let (status, body) = get(&router, "/api/route/22").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["directions"], json!({ "Southbound": south }));
    assert_eq!(body["skipped"], json!(["Northbound"]));
}

#[tokio::test]
async fn test_route_detail_ignores_directions_without_dir() {
    let tracker = Arc::new(FakeTracker {
        directions: Some(vec![json!({ "name": "?" }), json!({ "dir": "Eastbound" })]),
        stops: HashMap::from([("Eastbound".to_owned(), Some(vec![]))]),
        ..Default::default()
    });
    let router = app(tracker);

    let (status, body) = get(&router, "/api/route/66").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "route_id": "66", "directions": { "Eastbound": [] } }));
}

#[tokio::test]
async fn test_route_detail_fails_when_directions_fail_or_are_empty() {
    let router = app(Arc::new(FakeTracker::default()));
    let (status, body) = get(&router, "/api/route/22").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch route directions" }));

    let router = app(Arc::new(FakeTracker { directions: Some(vec![]), ..Default::default() }));
    let (status, _) = get(&router, "/api/route/22").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================================
// Predictions
// ============================================================================

#[tokio::test]
async fn test_predictions_unwraps_prd_list() {
    let prd = json!({ "stpid": "1001", "rt": "22", "prdtm": "20240101 12:05" });
    let tracker = Arc::new(FakeTracker { predictions: Some(vec![prd.clone()]), ..Default::default() });
    let router = app(Arc::clone(&tracker));

    let (status, body) = get(&router, "/api/predictions?stop=1001&route=22").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([prd]));
    assert_eq!(tracker.calls(), vec!["predictions 1001 22"]);
}

#[tokio::test]
async fn test_predictions_missing_either_param_is_400() {
    let tracker = Arc::new(FakeTracker { predictions: Some(vec![]), ..Default::default() });
    let router = app(Arc::clone(&tracker));

    for uri in [
        "/api/predictions",
        "/api/predictions?stop=1001",
        "/api/predictions?route=22",
        "/api/predictions?stop=&route=22",
    ] {
        let (status, body) = get(&router, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, json!({ "error": "Stop ID and Route ID are required" }));
    }
    assert!(tracker.calls().is_empty());
}

#[tokio::test]
async fn test_predictions_upstream_failure_is_500_never_partial() {
    let router = app(Arc::new(FakeTracker::default()));
    let (status, body) = get(&router, "/api/predictions?stop=1001&route=22").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch predictions" }));
}

// ============================================================================
// Time, health, routing, CORS
// ============================================================================

#[tokio::test]
async fn test_time_endpoint() {
    let tracker = Arc::new(FakeTracker { time: Some("20240101 12:00:00".into()), ..Default::default() });
    let (status, body) = get(&app(tracker), "/api/time").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "tm": "20240101 12:00:00" }));

    let (status, _) = get(&app(Arc::new(FakeTracker::default())), "/api/time").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_health_is_independent_of_upstream() {
    let tracker = Arc::new(FakeTracker::default());
    let router = app(Arc::clone(&tracker));

    let (status, body) = get(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));
    assert!(tracker.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let (status, body) = get(&app(Arc::new(FakeTracker::default())), "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "not found" }));
}

#[tokio::test]
async fn test_cors_headers_only_for_allowed_origins() {
    let tracker = Arc::new(FakeTracker { routes: Some(vec![]), ..Default::default() });
    let router = app(tracker);

    let allowed = http::Request::builder()
        .uri("/api/routes")
        .header("origin", "http://localhost:8000")
        .body(Bytes::new())
        .unwrap();
    let res = router.respond(allowed).await;
    assert_eq!(res.headers()["access-control-allow-origin"], "http://localhost:8000");

    let denied = http::Request::builder()
        .uri("/api/routes")
        .header("origin", "https://elsewhere.example")
        .body(Bytes::new())
        .unwrap();
    let res = router.respond(denied).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert!(res.headers().get("access-control-allow-origin").is_none());
}
