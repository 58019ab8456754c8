//! The transfer-engine capability contract.
//!
//! The transfer engine performs the actual network work: connection
//! management, TLS, DNS and HTTP framing for many transfers at once. This
//! crate drives it with readiness information and harvests finished
//! transfers, it never touches sockets itself.
//!
//! The engine talks back through [`EngineHooks`], a callback surface the
//! event loop passes into every mutating engine operation. Registration
//! requests (watch this socket, wake me in N milliseconds) and response data
//! (header lines, body chunks) all flow through it. All engine operations
//! happen on the reactor thread, implementations need not be thread-safe.

use std::time::Duration;

use http::Method;
use thiserror::Error;

use crate::protocol::HeaderMap;
use crate::reactor::{Interest, SocketFd};

mod session;
pub use session::SessionToken;
pub(crate) use session::{SessionTable, TransferSession};

/// Engine-assigned identity of one registered transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferId(pub u64);

/// Identity of one socket watch, handed out by [`EngineHooks::want_socket`].
///
/// The engine stores it in its per-socket slot and passes it back on
/// direction changes and removal, mirroring how multi-transfer engines
/// associate opaque per-socket data with each descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchKey(pub usize);

/// Connection-pool limits applied to the engine before the loop starts.
#[derive(Debug, Clone, Copy)]
pub struct PoolLimits {
    /// Total connection cap across all hosts.
    pub max_connections: usize,
    /// Per-host connection cap, `0` means no per-host limit.
    pub max_connections_per_host: usize,
}

/// Readiness information fed into [`TransferEngine::drive`].
#[derive(Debug, Clone, Copy)]
pub enum Stimulus {
    /// A watched socket became ready in the given directions.
    Socket { fd: SocketFd, readiness: Interest },
    /// The shared timeout elapsed, no specific socket.
    Timeout,
}

/// Everything the engine needs to start one transfer.
///
/// Borrowed from the submission for the duration of the `add_transfer`
/// call, engines keep their own copies of whatever they need beyond it. The
/// outgoing body stays alive in the session until the transfer completes.
#[derive(Debug)]
pub struct TransferSpec<'a> {
    pub method: Method,
    pub url: &'a str,
    pub headers: &'a HeaderMap,
    pub body: &'a [u8],
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Raises engine-level per-transfer diagnostics.
    pub verbose: bool,
}

/// Terminal state of a finished transfer.
#[derive(Debug)]
pub enum TransferOutcome {
    /// The transfer ran to completion with this response status.
    Success { status: http::StatusCode },
    /// Transport-level failure with the engine's diagnostic.
    Failed { message: String },
}

/// One finished transfer harvested via [`TransferEngine::poll_finished`].
#[derive(Debug)]
pub struct Finished {
    pub id: TransferId,
    pub token: SessionToken,
    pub outcome: TransferOutcome,
}

/// Rejection of an `add_transfer` call.
#[derive(Debug, Error)]
#[error("engine rejected transfer: {message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    pub fn new<S: ToString>(message: S) -> Self {
        Self { message: message.to_string() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Callback surface the engine drives during mutating operations.
///
/// Implemented by the event loop, which routes registration requests to the
/// reactor bridge and response data to the owning session. Handlers must
/// tolerate arbitrary ordering and repetition, engines re-request watches
/// and timeouts freely as transfers progress.
pub trait EngineHooks {
    /// The engine wants `fd` watched for `interest`. `existing` is the key
    /// this surface handed out earlier for the same socket, if any. Returns
    /// the key the engine should store in its per-socket slot.
    fn want_socket(&mut self, fd: SocketFd, interest: Interest, existing: Option<WatchKey>) -> WatchKey;

    /// The engine is done with a socket. Absent or already-removed keys are
    /// a no-op.
    fn drop_socket(&mut self, watch: Option<WatchKey>);

    /// Replace the shared timeout: disarm unconditionally, then arm the new
    /// deadline if one is given.
    fn want_timeout(&mut self, timeout: Option<Duration>);

    /// A chunk of response body arrived for the transfer owning `token`.
    fn append_body(&mut self, token: SessionToken, chunk: &[u8]);

    /// A raw response header line arrived for the transfer owning `token`.
    fn header_line(&mut self, token: SessionToken, line: &[u8]);
}

/// Multi-transfer engine driven by socket readiness.
///
/// For a single transfer, header lines are delivered before the body is
/// complete, and the transfer only shows up in [`poll_finished`] after all
/// of its data has been delivered through the hooks.
///
/// [`poll_finished`]: Self::poll_finished
pub trait TransferEngine {
    /// Applies pool limits. Called once on the reactor thread before the
    /// event loop starts.
    fn configure(&mut self, limits: PoolLimits);

    /// Registers a new transfer. The engine may invoke hooks synchronously,
    /// typically to request an immediate timeout.
    fn add_transfer(
        &mut self,
        spec: TransferSpec<'_>,
        token: SessionToken,
        hooks: &mut dyn EngineHooks,
    ) -> Result<TransferId, EngineError>;

    /// Unregisters a finished or abandoned transfer. May drop sockets
    /// through the hooks.
    fn remove_transfer(&mut self, id: TransferId, hooks: &mut dyn EngineHooks);

    /// Makes progress using the given readiness information and returns the
    /// number of transfers still running.
    fn drive(&mut self, stimulus: Stimulus, hooks: &mut dyn EngineHooks) -> usize;

    /// Pops one finished transfer, if any. Drained repeatedly after every
    /// `drive` call until it returns `None`.
    fn poll_finished(&mut self) -> Option<Finished>;
}
