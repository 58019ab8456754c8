//! Client handle, configuration and the reactor-thread orchestration.
//!
//! [`Client`] is the entry point for issuing requests. Building one spawns
//! the reactor thread, which owns the transfer engine, the socket watches
//! and every in-flight session for the client's whole lifetime:
//!
//! - [`ClientBuilder`] wires together the engine, reactor and executor
//!   capabilities and spawns the loop
//! - `event_loop` drives the engine from readiness and timer events
//! - `bridge` keeps reactor registrations in step with what the engine asks
//!   for
//! - `drain` harvests finished transfers and dispatches callbacks
//!
//! Submission is thread-safe: any number of caller threads may submit
//! concurrently, requests cross to the reactor thread through a channel and
//! the caller never blocks on network I/O.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use bytes::Bytes;
use crossbeam_channel::Sender;
use http::Method;
use tracing::error;

use crate::codec::query_encoder;
use crate::ensure;
use crate::executor::Executor;
use crate::protocol::{BuildError, Callback, GetRequest, HeaderMap, PostRequest, SubmitError};
use crate::reactor::Reactor;
use crate::transfer::TransferEngine;

mod config;
pub use config::ClientConfig;

mod bridge;
mod drain;
mod event_loop;

use event_loop::{EventLoop, Submission};

/// State shared between the client handle, the reactor thread and every
/// in-flight session.
///
/// Sessions hold a strong reference so the shared state outlives any
/// transfer still in flight, the reference is released exactly once per
/// session, at teardown.
#[derive(Debug)]
pub(crate) struct Shared {
    running: AtomicBool,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self { running: AtomicBool::new(true) }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn shut_down(&self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Assembles a [`Client`] from its three capabilities.
///
/// The transfer engine and reactor move onto the reactor thread, the
/// executor is shared with it.
pub struct ClientBuilder<E, R> {
    engine: E,
    reactor: R,
    executor: Option<Arc<dyn Executor>>,
    config: ClientConfig,
}

impl<E, R> ClientBuilder<E, R>
where
    E: TransferEngine + Send + 'static,
    R: Reactor + Send + 'static,
    R::Io: Send + 'static,
{
    pub fn new(engine: E, reactor: R) -> Self {
        Self { engine, reactor, executor: None, config: ClientConfig::default() }
    }

    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Spawns the reactor thread and returns the client handle.
    pub fn build(self) -> Result<Client, BuildError> {
        let executor = self.executor.ok_or(BuildError::MissingExecutor)?;
        let shared = Arc::new(Shared::new());
        let (sender, receiver) = crossbeam_channel::unbounded();

        let event_loop = EventLoop::new(self.engine, self.reactor, executor, receiver, Arc::clone(&shared), self.config);
        let reactor_thread =
            std::thread::Builder::new().name("micro-fetch-reactor".to_owned()).spawn(move || event_loop.run())?;

        Ok(Client { shared, inbox: sender, reactor_thread: Some(reactor_thread) })
    }
}

impl<E, R> fmt::Debug for ClientBuilder<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("config", &self.config)
            .field("executor", &self.executor.is_some())
            .finish_non_exhaustive()
    }
}

/// Asynchronous HTTP client multiplexing many transfers over one reactor
/// thread.
///
/// Requests are submitted with [`get`](Self::get) and [`post`](Self::post),
/// both return as soon as the request has crossed into the reactor thread.
/// The request's callback is invoked exactly once, on an executor worker
/// thread, with the finished response or the transfer failure.
///
/// Dropping the client stops the reactor thread and joins it. Transfers
/// still in flight are abandoned, their callbacks are never invoked.
#[derive(Debug)]
pub struct Client {
    shared: Arc<Shared>,
    inbox: Sender<Submission>,
    reactor_thread: Option<JoinHandle<()>>,
}

impl Client {
    /// Starts building a client. See [`ClientBuilder`].
    pub fn builder<E, R>(engine: E, reactor: R) -> ClientBuilder<E, R>
    where
        E: TransferEngine + Send + 'static,
        R: Reactor + Send + 'static,
        R::Io: Send + 'static,
    {
        ClientBuilder::new(engine, reactor)
    }

    /// Submits a GET request.
    ///
    /// Query parameters are percent-encoded and appended to the url here, on
    /// the calling thread, before submission.
    pub fn get(&self, request: GetRequest) -> Result<(), SubmitError> {
        let GetRequest { mut url, headers, query_params, callback } = request;
        query_encoder::append_query(&mut url, &query_params);
        self.submit(Method::GET, url, headers, Bytes::new(), callback)
    }

    /// Submits a POST request.
    ///
    /// A raw body and form parameters are mutually exclusive. Form
    /// parameters are encoded into the body here, on the calling thread,
    /// with neither present an empty body is sent.
    pub fn post(&self, request: PostRequest) -> Result<(), SubmitError> {
        let PostRequest { url, headers, body, form_params, callback } = request;
        ensure!(!(body.is_some() && !form_params.is_empty()), SubmitError::BodyAndFormParams);

        let body = match body {
            Some(body) => body,
            None => query_encoder::form_body(&form_params),
        };
        self.submit(Method::POST, url, headers, body, callback)
    }

    fn submit(
        &self,
        method: Method,
        url: String,
        headers: HeaderMap,
        body: Bytes,
        callback: Callback,
    ) -> Result<(), SubmitError> {
        ensure!(!url.is_empty(), SubmitError::EmptyUrl);
        ensure!(self.shared.is_running(), SubmitError::Closed);

        self.inbox.send(Submission { method, url, headers, body, callback }).map_err(|_| SubmitError::Closed)
    }
}

impl Drop for Client {
    /// Signals the reactor thread to stop and joins it.
    ///
    /// The loop observes the flag within one poll tick. In-flight transfers
    /// are abandoned without invoking their callbacks.
    fn drop(&mut self) {
        self.shared.shut_down();
        if let Some(handle) = self.reactor_thread.take() {
            if handle.join().is_err() {
                error!("reactor thread panicked");
            }
        }
    }
}
