//! Core client-facing protocol types.
//!
//! This module provides the data model shared by callers and the reactor
//! side: requests under construction, finished responses, the header map and
//! the error types.
//!
//! # Architecture
//!
//! The protocol module is organized into several key components:
//!
//! - **Request Building** ([`request`]): Typed requests owned by the caller
//!   - [`GetRequest`]: GET with an ordered set of query parameters
//!   - [`PostRequest`]: POST with a raw body or form parameters
//!   - [`Callback`]: Completion callback type, invoked exactly once
//!
//! - **Response Handling** ([`response`]): The finished response value
//!   - [`Response`]: Immutable `{status, headers, body}` triple
//!
//! - **Header Storage** ([`headers`]): Case handling for header names
//!   - [`HeaderMap`]: Case-insensitive keys, original casing preserved
//!
//! - **Error Handling** ([`error`]): Comprehensive error types
//!   - [`TransferError`]: Terminal transfer failure, delivered via callback
//!   - [`SubmitError`]: Synchronous submission validation errors
//!   - [`BuildError`]: Client construction errors
//!
//! Requests are consumed on submission. The response value handed to a
//! callback is self-contained and never references client internals.

mod headers;
pub use headers::HeaderMap;

mod request;
pub use request::Callback;
pub use request::GetRequest;
pub use request::PostRequest;

mod response;
pub use response::Response;

mod error;
pub use error::BuildError;
pub use error::SubmitError;
pub use error::TransferError;
