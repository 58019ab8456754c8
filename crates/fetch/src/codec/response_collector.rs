//! Incremental assembly of one HTTP response.
//!
//! The transfer engine delivers response data piecemeal as sockets become
//! readable: raw header lines first, then body chunks in arbitrary sizes.
//! [`ResponseCollector`] accumulates both for a single transfer and produces
//! the final immutable [`Response`] once the engine reports the transfer
//! finished.

use bytes::Bytes;
use http::StatusCode;

use crate::protocol::{HeaderMap, Response};

/// Growable body buffer with a logical length tracked separately from the
/// allocated capacity.
///
/// Capacity only grows, by at least the amount needed, using a 1.5x factor
/// so the number of reallocations stays logarithmic in the total body size.
#[derive(Debug, Default)]
struct BodyBuffer {
    /// Backing storage, `buf.len()` is the allocated capacity.
    buf: Vec<u8>,
    /// Bytes written so far, always `<= buf.len()`.
    len: usize,
}

impl BodyBuffer {
    fn append(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }
        let needed = self.len + chunk.len();
        if needed > self.buf.len() {
            self.buf.resize(needed + needed / 2, 0);
        }
        self.buf[self.len..needed].copy_from_slice(chunk);
        self.len = needed;
    }

    /// Truncates to the logical length and moves the bytes out, leaving the
    /// buffer empty.
    fn take(&mut self) -> Bytes {
        let mut buf = std::mem::take(&mut self.buf);
        buf.truncate(self.len);
        self.len = 0;
        Bytes::from(buf)
    }

    #[cfg(test)]
    fn capacity(&self) -> usize {
        self.buf.len()
    }
}

/// Accumulates status, headers and body bytes for one in-flight transfer.
///
/// Mutated only on the reactor thread while the transfer is in progress.
/// Header lines always arrive before the body is complete, so by the time
/// [`finalize`](Self::finalize) runs the header map is settled.
#[derive(Debug, Default)]
pub struct ResponseCollector {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BodyBuffer,
}

impl ResponseCollector {
    pub fn new() -> Self {
        Default::default()
    }

    /// Records the terminal status code reported by the transfer engine.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Appends a chunk of body bytes. No-op on empty input.
    pub fn append_body(&mut self, chunk: &[u8]) {
        self.body.append(chunk);
    }

    /// Stores one raw header line of the form `name: value`.
    ///
    /// Leading spaces after the colon and a trailing CRLF are trimmed. Lines
    /// with no colon, with an empty name, or shorter than 3 bytes are
    /// ignored, servers send blank separator lines and those are not errors.
    /// Names compare case-insensitively, the last value for a repeated name
    /// wins while the first-seen spelling is kept.
    pub fn set_header(&mut self, raw: &[u8]) {
        if raw.len() < 3 {
            return;
        }
        let Some(colon) = raw.iter().position(|&b| b == b':') else {
            return;
        };
        if colon == 0 {
            return;
        }

        let name = &raw[..colon];
        let mut value = &raw[colon + 1..];
        while let Some((&b' ', rest)) = value.split_first() {
            value = rest;
        }
        while let Some((&(b'\r' | b'\n'), rest)) = value.split_last() {
            value = rest;
        }

        self.headers.insert(String::from_utf8_lossy(name).into_owned(), String::from_utf8_lossy(value).into_owned());
    }

    /// Produces the finished response, leaving the collector empty.
    ///
    /// The body is truncated to exactly the bytes written, over-allocated
    /// growth never reaches the caller.
    pub fn finalize(&mut self) -> Response {
        Response::new(self.status.take().unwrap_or(StatusCode::OK), std::mem::take(&mut self.headers), self.body.take())
    }
}
