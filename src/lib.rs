//! # bustrack
//!
//! A thin proxy between browser clients and the CTA Bus Tracker API.
//!
//! The browser asks for routes, vehicle positions, stops and arrival
//! predictions. bustrack checks the parameters, makes the authenticated
//! vendor call, strips the `bustime-response` envelope and returns the bare
//! list. Nothing is cached, retried or stored.
//!
//! ```text
//! browser ──► Router (CORS, access log)
//!                └─► Gateway (400 on missing params)
//!                       └─► BusTracker / BusTimeClient (key + format=json)
//!                              └─► ctabustracker.com
//! ```
//!
//! ## Running
//!
//! ```rust,no_run
//! use bustrack::{Config, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), bustrack::Error> {
//!     let config = Config::from_env()?;
//!     Server::bind(&config.bind_addr())
//!         .await?
//!         .serve(bustrack::app(&config))
//!         .await
//! }
//! ```

use std::sync::Arc;

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod bustime;
pub mod config;
pub mod gateway;
pub mod health;
pub mod middleware;

pub use bustime::{BusTimeClient, BusTracker, UpstreamError};
pub use config::Config;
pub use error::Error;
pub use gateway::Gateway;
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;

/// The full application router for `config`, talking to the real vendor.
pub fn app(config: &Config) -> Router {
    let tracker = Arc::new(BusTimeClient::from_config(config));
    gateway::router(
        Gateway::new(tracker),
        middleware::Cors::new(config.allowed_origins.clone()),
    )
}
