//! The reactor-thread event loop.
//!
//! Exactly one thread per client runs [`EventLoop::run`] for the client's
//! whole lifetime. It is the only thread that touches the transfer engine,
//! the session table and the socket watches, which is what makes the rest of
//! the crate lock-free: confinement by construction, not by mutex.
//!
//! Each iteration picks up new submissions from the caller-facing channel,
//! waits on the reactor for the next readiness or timer wakeup (bounded by
//! one tick so the stop flag is polled), and feeds every event into the
//! engine one at a time. After every single progress call the completion
//! drain runs, progress on one transfer can finish others or move the shared
//! timeout, so harvesting cannot wait for the end of the iteration.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use tracing::{debug, error, trace, warn};

use crate::client::bridge::ReactorBridge;
use crate::client::drain::drain_completions;
use crate::client::{ClientConfig, Shared};
use crate::executor::Executor;
use crate::protocol::{Callback, HeaderMap, TransferError};
use crate::reactor::{Interest, Reactor, ReactorEvent, SocketFd};
use crate::transfer::{
    EngineHooks, SessionTable, SessionToken, Stimulus, TransferEngine, TransferSession, TransferSpec, WatchKey,
};

use bytes::Bytes;
use http::Method;

/// Upper bound on one reactor wait, the stop flag and the submission inbox
/// are checked at least this often.
const STOP_POLL_TICK: Duration = Duration::from_millis(100);

/// A validated, fully-encoded request crossing from a caller thread to the
/// reactor thread. Built entirely on the calling side, the reactor never
/// encodes anything.
pub(crate) struct Submission {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) callback: Callback,
}

/// Hook surface handed to the engine for the duration of one mutating call.
///
/// Splits borrows of the event loop: registration requests go to the bridge,
/// response data goes to the owning session. Data for a stale token is
/// dropped with a warning instead of reaching a recycled session.
pub(crate) struct LoopHooks<'a, R: Reactor> {
    pub(crate) bridge: &'a mut ReactorBridge<R>,
    pub(crate) sessions: &'a mut SessionTable,
}

impl<R: Reactor> EngineHooks for LoopHooks<'_, R> {
    fn want_socket(&mut self, fd: SocketFd, interest: Interest, existing: Option<WatchKey>) -> WatchKey {
        self.bridge.want_socket(fd, interest, existing)
    }

    fn drop_socket(&mut self, watch: Option<WatchKey>) {
        self.bridge.drop_socket(watch);
    }

    fn want_timeout(&mut self, timeout: Option<Duration>) {
        self.bridge.want_timeout(timeout);
    }

    fn append_body(&mut self, token: SessionToken, chunk: &[u8]) {
        match self.sessions.get_mut(token) {
            Some(session) => session.collector.append_body(chunk),
            None => warn!(?token, "body chunk for unknown session dropped"),
        }
    }

    fn header_line(&mut self, token: SessionToken, line: &[u8]) {
        match self.sessions.get_mut(token) {
            Some(session) => session.collector.set_header(line),
            None => warn!(?token, "header line for unknown session dropped"),
        }
    }
}

/// State owned by the reactor thread.
pub(crate) struct EventLoop<E: TransferEngine, R: Reactor> {
    engine: E,
    bridge: ReactorBridge<R>,
    sessions: SessionTable,
    executor: Arc<dyn Executor>,
    inbox: Receiver<Submission>,
    shared: Arc<Shared>,
    config: ClientConfig,
}

impl<E: TransferEngine, R: Reactor> EventLoop<E, R> {
    pub(crate) fn new(
        engine: E,
        reactor: R,
        executor: Arc<dyn Executor>,
        inbox: Receiver<Submission>,
        shared: Arc<Shared>,
        config: ClientConfig,
    ) -> Self {
        Self {
            engine,
            bridge: ReactorBridge::new(reactor),
            sessions: SessionTable::new(),
            executor,
            inbox,
            shared,
            config,
        }
    }

    /// Runs until the stop flag clears.
    ///
    /// Transfers still in flight when the loop exits are abandoned, their
    /// callbacks never run.
    pub(crate) fn run(mut self) {
        self.engine.configure(self.config.pool_limits());
        debug!(config = ?self.config, "reactor loop started");

        let mut events = Vec::new();
        while self.shared.is_running() {
            self.accept_submissions();

            events.clear();
            if let Err(e) = self.bridge.wait(STOP_POLL_TICK, &mut events) {
                error!(cause = %e, "reactor wait failed");
                continue;
            }
            for event in events.drain(..) {
                self.dispatch(event);
            }
        }

        let abandoned = self.sessions.len();
        if abandoned > 0 {
            debug!(abandoned, "reactor loop stopped with transfers in flight, their callbacks will not run");
        } else {
            debug!("reactor loop stopped");
        }
    }

    fn accept_submissions(&mut self) {
        while let Ok(submission) = self.inbox.try_recv() {
            self.register(submission);
        }
    }

    /// Builds the session for a submission and registers the transfer.
    ///
    /// The session is indexed before the engine sees the token, so hooks
    /// fired synchronously from `add_transfer` already resolve it.
    fn register(&mut self, submission: Submission) {
        let Submission { method, url, headers, body, callback } = submission;

        let session = TransferSession::new(url.clone(), body.clone(), callback, Arc::clone(&self.shared));
        let token = self.sessions.insert(session);

        let spec = TransferSpec {
            method,
            url: &url,
            headers: &headers,
            body: &body,
            connect_timeout: self.config.connect_timeout,
            request_timeout: self.config.request_timeout,
            verbose: self.config.debug_logging,
        };

        let result = {
            let mut hooks = LoopHooks { bridge: &mut self.bridge, sessions: &mut self.sessions };
            self.engine.add_transfer(spec, token, &mut hooks)
        };

        match result {
            Ok(id) => {
                trace!(url = %url, id = id.0, "transfer registered");
                if let Some(session) = self.sessions.get_mut(token) {
                    session.transfer = Some(id);
                }
            }
            Err(e) => {
                warn!(url = %url, cause = %e, "engine rejected transfer");
                if let Some(session) = self.sessions.remove(token) {
                    let (_, _, callback) = session.into_parts();
                    let error = TransferError::new(e.message());
                    self.executor.submit(Box::new(move || callback(Err(error))));
                }
            }
        }

        // registration may complete transfers synchronously, e.g. pool limits
        self.drain();
    }

    /// Feeds one reactor event into the engine and harvests completions.
    fn dispatch(&mut self, event: ReactorEvent) {
        let stimulus = match event {
            ReactorEvent::Io { fd, readiness } => Stimulus::Socket { fd, readiness },
            ReactorEvent::TimerExpired => Stimulus::Timeout,
        };

        let remaining = {
            let mut hooks = LoopHooks { bridge: &mut self.bridge, sessions: &mut self.sessions };
            self.engine.drive(stimulus, &mut hooks)
        };

        // nothing running means no deadline worth keeping
        if matches!(stimulus, Stimulus::Socket { .. }) && remaining == 0 {
            self.bridge.disarm_timer();
        }

        self.drain();
    }

    fn drain(&mut self) {
        drain_completions(&mut self.engine, &mut self.bridge, &mut self.sessions, self.executor.as_ref());
    }
}
