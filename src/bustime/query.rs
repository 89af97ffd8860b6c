//! Vendor endpoints and the query parameters each one takes.

/// One vendor endpoint: its path segment and the envelope key its payload
/// lives under.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Endpoint {
    Time,
    Vehicles,
    Routes,
    Directions,
    Stops,
    Predictions,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Time        => "gettime",
            Self::Vehicles    => "getvehicles",
            Self::Routes      => "getroutes",
            Self::Directions  => "getdirections",
            Self::Stops       => "getstops",
            Self::Predictions => "getpredictions",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Time        => "tm",
            Self::Vehicles    => "vehicle",
            Self::Routes      => "routes",
            Self::Directions  => "directions",
            Self::Stops       => "stops",
            Self::Predictions => "prd",
        }
    }
}

/// Ordered `name=value` pairs, before `key` and `format` are appended.
pub type Params = Vec<(&'static str, String)>;

/// Filter for `getvehicles`. At least one list should be non-empty for a
/// meaningful answer; the vendor decides what an empty query means.
#[derive(Clone, Debug, Default)]
pub struct VehicleQuery {
    pub route_ids: Vec<String>,
    pub vehicle_ids: Vec<String>,
}

impl VehicleQuery {
    pub fn routes<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { route_ids: ids.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    pub fn params(&self) -> Params {
        let mut params = Params::new();
        if !self.route_ids.is_empty() {
            params.push(("rt", self.route_ids.join(",")));
        }
        if !self.vehicle_ids.is_empty() {
            params.push(("vid", self.vehicle_ids.join(",")));
        }
        params
    }
}

/// Filter for `getpredictions`.
#[derive(Clone, Debug, Default)]
pub struct PredictionQuery {
    pub stop_id: Option<String>,
    pub route_id: Option<String>,
    pub vehicle_id: Option<String>,
    pub max_results: Option<u32>,
}

impl PredictionQuery {
    pub fn stop_on_route(stop_id: impl Into<String>, route_id: impl Into<String>) -> Self {
        Self {
            stop_id: Some(stop_id.into()),
            route_id: Some(route_id.into()),
            ..Self::default()
        }
    }

    pub fn params(&self) -> Params {
        let mut params = Params::new();
        let present = |v: &Option<String>| v.as_ref().filter(|s| !s.is_empty()).cloned();
        if let Some(stop) = present(&self.stop_id) {
            params.push(("stpid", stop));
        }
        if let Some(route) = present(&self.route_id) {
            params.push(("rt", route));
        }
        if let Some(vehicle) = present(&self.vehicle_id) {
            params.push(("vid", vehicle));
        }
        // Zero reads as unset, same as an absent value.
        if let Some(top) = self.max_results.filter(|n| *n > 0) {
            params.push(("top", top.to_string()));
        }
        params
    }
}
