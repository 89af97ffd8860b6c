//! Cross-origin resource sharing for the JSON API.
//!
//! Only paths under `/api/` are decorated. A request whose `Origin` is on
//! the allow-list gets it echoed back in `access-control-allow-origin`;
//! everything else is left untouched and the browser enforces the
//! same-origin policy itself.

use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

const ALLOW_METHODS: &str = "GET, OPTIONS";
const MAX_AGE_SECS: &str = "600";
const API_PREFIX: &str = "/api/";

/// Origin allow-list for the JSON API.
#[derive(Clone, Debug)]
pub struct Cors {
    origins: Vec<String>,
}

impl Cors {
    /// An entry of `*` allows any origin.
    pub fn new(origins: Vec<String>) -> Self {
        Self { origins }
    }

    pub fn applies_to(&self, path: &str) -> bool {
        path.starts_with(API_PREFIX)
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == "*" || o == origin)
    }

    /// Answers an `OPTIONS` preflight for a covered path.
    ///
    /// Returns `None` for paths outside `/api/` so normal routing applies.
    pub fn preflight(&self, req: &Request) -> Option<Response> {
        if !self.applies_to(req.path()) {
            return None;
        }
        let mut res = Response::status(Status::NoContent);
        if let Some(origin) = req.header("origin").filter(|o| self.allows(o)) {
            res.set_header("access-control-allow-origin", origin);
            res.set_header("access-control-allow-methods", ALLOW_METHODS);
            res.set_header("access-control-max-age", MAX_AGE_SECS);
            if let Some(requested) = req.header("access-control-request-headers") {
                res.set_header("access-control-allow-headers", requested);
            }
            res.set_header("vary", "origin");
        }
        Some(res)
    }

    /// Adds CORS headers to a routed response when the origin is allowed.
    pub fn decorate(&self, path: &str, origin: Option<&str>, res: &mut Response) {
        if !self.applies_to(path) {
            return;
        }
        if let Some(origin) = origin.filter(|o| self.allows(o)) {
            res.set_header("access-control-allow-origin", origin);
            res.set_header("vary", "origin");
        }
    }
}
