//! An asynchronous micro HTTP client implementation
//!
//! This crate provides a lightweight, callback-driven HTTP client core that
//! multiplexes many concurrent GET/POST transfers over a single reactor
//! thread and a bounded connection pool. It focuses on the orchestration
//! layer: the actual transport (connections, TLS, DNS, HTTP framing), the
//! socket/timer notification source and the worker pool that runs user
//! callbacks are pluggable capabilities, supplied as implementations of the
//! [`transfer::TransferEngine`], [`reactor::Reactor`] and
//! [`executor::Executor`] traits.
//!
//! # Features
//!
//! - Concurrent GET/POST requests over one shared event loop
//! - Exactly-once completion callback per request, off the reactor thread
//! - Non-blocking submission from any number of caller threads
//! - Incremental response assembly with amortized buffer growth
//! - Case-insensitive, casing-preserving header handling
//! - Eager percent-encoding of query parameters and form bodies
//! - Clean shutdown: dropping the client stops and joins the reactor thread
//!
//! # Example
//!
//! Building requests is independent of any running client:
//!
//! ```
//! use micro_fetch::protocol::{GetRequest, PostRequest};
//!
//! let get = GetRequest::new("http://127.0.0.1:8080/search", |result| match result {
//!     Ok(response) => println!("status: {}", response.status()),
//!     Err(e) => eprintln!("request failed: {e}"),
//! })
//! .header("Accept", "application/json")
//! .query_param("q", "rust");
//!
//! let post = PostRequest::new("http://127.0.0.1:8080/login", |_result| {})
//!     .form_param("user", "zava")
//!     .form_param("pass", "hunter2");
//! ```
//!
//! A client is assembled from its three capabilities and a configuration,
//! then requests are submitted through it:
//!
//! ```text
//! let client = Client::builder(engine, reactor)
//!     .executor(executor)
//!     .config(ClientConfig::default())
//!     .build()?;
//!
//! client.get(get)?;
//! client.post(post)?;
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`client`]: Client handle, configuration and reactor-thread
//!   orchestration
//! - [`protocol`]: Request/response data model and error types
//! - [`codec`]: Query/form encoding and incremental response assembly
//! - [`transfer`]: The transfer-engine capability contract and per-transfer
//!   session state
//! - [`reactor`]: The socket-readiness and timer capability contract
//! - [`executor`]: The worker-pool capability contract
//!
//! # Threading Model
//!
//! Each client owns exactly one reactor thread, started at construction and
//! joined on drop. That thread is the only one that calls into the transfer
//! engine or touches per-transfer state, callers only ever hand fully-built
//! submissions across a channel. Completion callbacks run on executor worker
//! threads, never on the reactor thread, so a callback can submit new
//! requests without reentering the loop.
//!
//! # Error Handling
//!
//! A transfer either succeeds completely, the callback receives status,
//! headers and body, or fails completely with a
//! [`protocol::TransferError`] carrying the engine's diagnostic, partial
//! data is discarded. Submission-time validation errors are returned
//! synchronously as [`protocol::SubmitError`].
//!
//! # Limitations
//!
//! - GET and POST only
//! - No per-request cancellation, shutdown abandons in-flight transfers
//!   without invoking their callbacks
//! - No automatic retry, retrying failed transfers is the caller's call

pub mod client;
pub mod codec;
pub mod executor;
pub mod protocol;
pub mod reactor;
pub mod transfer;

mod utils;
pub(crate) use utils::ensure;
