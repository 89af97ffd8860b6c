//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. CORS and the access log
//! wrap every dispatch; handlers never see them.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;
use tracing::error;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{Cors, trace};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Each [`Router::on`] call returns `self` so registrations chain.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    cors: Option<Cors>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), cors: None }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if the path is malformed or conflicts with an existing route.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Shorthand for `on(Method::Get, …)`.
    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn cors(mut self, cors: Cors) -> Self {
        self.cors = Some(cors);
        self
    }

    /// Routes one fully-buffered request and produces its response.
    ///
    /// This is what the server calls per request; tests call it directly.
    /// `HEAD` is served by the `GET` handler with the body dropped and its
    /// length kept in `content-length`.
    pub async fn respond(&self, req: http::Request<Bytes>) -> Response {
        let started = Instant::now();
        let (parts, _body) = req.into_parts();
        let method = Method::from_http(&parts.method);
        let path = parts.uri.path().to_owned();
        let origin = parts
            .headers
            .get(http::header::ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let mut response = match method {
            None => Response::error(Status::MethodNotAllowed, "method not allowed"),
            Some(m) => self.route(m, parts).await,
        };

        if method == Some(Method::Head) {
            let len = response.body.len().to_string();
            response.set_header("content-length", &len);
            response.body = Bytes::new();
        }

        if let Some(cors) = &self.cors {
            cors.decorate(&path, origin.as_deref(), &mut response);
        }
        trace::record(method, &path, response.status, started.elapsed());
        response
    }

    async fn route(&self, method: Method, parts: http::request::Parts) -> Response {
        let path = parts.uri.path().to_owned();

        let found = self.lookup(method, &path).or_else(|| match method {
            Method::Head => self.lookup(Method::Get, &path),
            _ => None,
        });

        match found {
            Some((handler, params)) => {
                let req = Request::new(parts, params);
                run(handler, req).await
            }
            None if method == Method::Options => {
                let req = Request::new(parts, HashMap::new());
                self.cors
                    .as_ref()
                    .and_then(|cors| cors.preflight(&req))
                    .unwrap_or_else(|| self.not_routed(method, &path))
            }
            None => self.not_routed(method, &path),
        }
    }

    fn not_routed(&self, method: Method, path: &str) -> Response {
        let elsewhere = self
            .routes
            .iter()
            .any(|(m, tree)| *m != method && tree.at(path).is_ok());
        if elsewhere {
            Response::error(Status::MethodNotAllowed, "method not allowed")
        } else {
            Response::error(Status::NotFound, "not found")
        }
    }

    /// Finds the handler for `method` + `path`. Path parameters come back
    /// percent-decoded (`/api/route/X%209` yields `X 9`).
    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), percent_decode_str(v).decode_utf8_lossy().into_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// Runs a handler on its own task so a panic inside it becomes a 500 carrying
/// the panic message instead of tearing down the connection.
async fn run(handler: BoxedHandler, req: Request) -> Response {
    match tokio::spawn(handler.call(req)).await {
        Ok(response) => response,
        Err(e) if e.is_panic() => {
            let message = panic_message(e.into_panic());
            error!("handler panicked: {message}");
            Response::error(Status::InternalServerError, message)
        }
        Err(e) => {
            error!("handler task failed: {e}");
            Response::error(Status::InternalServerError, e.to_string())
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(s) => *s,
        Err(payload) => payload
            .downcast_ref::<&'static str>()
            .map(|s| (*s).to_owned())
            .unwrap_or_else(|| "internal error".to_owned()),
    }
}
