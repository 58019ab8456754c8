use std::io;
use thiserror::Error;

/// Terminal failure of a transfer, delivered through the request callback.
///
/// Covers everything the transfer engine can fail with before or during a
/// transfer: connect errors, DNS resolution, TLS handshakes, timeouts and
/// engine-internal faults. The message is the engine's human-readable
/// diagnostic. A failed transfer carries no response data, partial bytes
/// received before the failure are discarded.
#[derive(Debug, Error)]
#[error("transfer failed: {message}")]
pub struct TransferError {
    message: String,
}

impl TransferError {
    pub fn new<S: ToString>(message: S) -> Self {
        Self { message: message.to_string() }
    }

    /// The engine-supplied diagnostic string.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors reported synchronously by [`Client::get`] and [`Client::post`],
/// before the request reaches the transfer engine.
///
/// [`Client::get`]: crate::client::Client::get
/// [`Client::post`]: crate::client::Client::post
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("request url must not be empty")]
    EmptyUrl,

    #[error("post body and form parameters are mutually exclusive")]
    BodyAndFormParams,

    #[error("client is shut down")]
    Closed,
}

/// Errors from [`ClientBuilder::build`].
///
/// [`ClientBuilder::build`]: crate::client::ClientBuilder::build
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("executor must be set")]
    MissingExecutor,

    #[error("failed to spawn reactor thread: {source}")]
    SpawnThread {
        #[from]
        source: io::Error,
    },
}
