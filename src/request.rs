//! Incoming HTTP request type.

use std::collections::HashMap;

use http::HeaderMap;

/// What a handler sees of an incoming request: path, decoded query string,
/// headers and path parameters. The API is read-only, so bodies are not kept.
pub struct Request {
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: HeaderMap,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(parts: http::request::Parts, params: HashMap<String, String>) -> Self {
        let query = parts
            .uri
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            path: parts.uri.path().to_owned(),
            query,
            headers: parts.headers,
            params,
        }
    }

    pub fn path(&self) -> &str { &self.path }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/api/route/{route_id}`, `req.param("route_id")` on
    /// `/api/route/22` returns `Some("22")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns the first non-empty value of a query-string parameter.
    ///
    /// `?routes=` and a missing `routes` are the same thing to callers.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }
}
