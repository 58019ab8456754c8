use bytes::Bytes;
use http::StatusCode;

use crate::protocol::HeaderMap;

/// A fully received HTTP response.
///
/// Produced by the reactor side once the transfer engine reports a transfer
/// as finished, and handed to the request callback through the executor. The
/// value is self-contained: it borrows nothing from the client internals, so
/// the callback is free to move it anywhere.
#[derive(Debug, Default)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self { status, headers, body }
    }

    /// The response status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers, keyed case-insensitively.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consumes the response and returns its body.
    pub fn into_body(self) -> Bytes {
        self.body
    }
}
