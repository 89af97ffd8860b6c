//! Unified error type for process-level failures.

use thiserror::Error;

use crate::config::ConfigError;

/// The error type returned by bustrack's fallible startup and serve paths.
///
/// Per-request failures (missing parameters, upstream outages) are expressed
/// as HTTP [`Response`](crate::Response) values, not as `Error`s. This type
/// surfaces infrastructure failures: bad configuration, binding to a port,
/// accepting a connection.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}
