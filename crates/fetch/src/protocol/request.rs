//! Request types built by the caller and consumed on submission.
//!
//! A request owns its completion callback. Submitting moves the whole request
//! into the client, after that the caller never touches it again, the
//! callback fires exactly once with either a [`Response`] or a
//! [`TransferError`].

use std::fmt;

use bytes::Bytes;

use crate::protocol::{HeaderMap, Response, TransferError};

/// Completion callback invoked exactly once per submitted request, on an
/// executor worker thread.
pub type Callback = Box<dyn FnOnce(Result<Response, TransferError>) + Send + 'static>;

/// A GET request under construction.
///
/// Query parameters form an ordered set: insertion order is kept and adding
/// a key twice replaces the earlier value in place. They are percent-encoded
/// and appended to the url on submission.
pub struct GetRequest {
    pub(crate) url: String,
    pub(crate) headers: HeaderMap,
    pub(crate) query_params: Vec<(String, String)>,
    pub(crate) callback: Callback,
}

impl GetRequest {
    pub fn new(url: impl Into<String>, callback: impl FnOnce(Result<Response, TransferError>) + Send + 'static) -> Self {
        Self { url: url.into(), headers: HeaderMap::new(), query_params: Vec::new(), callback: Box::new(callback) }
    }

    /// Adds a request header. Names compare case-insensitively and the last
    /// write wins.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Adds a url query parameter.
    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        upsert_pair(&mut self.query_params, name.into(), value.into());
        self
    }
}

impl fmt::Debug for GetRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetRequest")
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("query_params", &self.query_params)
            .finish_non_exhaustive()
    }
}

/// A POST request under construction.
///
/// A raw body and form parameters are mutually exclusive, setting both is
/// rejected at submission. With neither, an empty body is sent. Form
/// parameters are percent-encoded and joined with `&`/`=` into the body on
/// submission.
pub struct PostRequest {
    pub(crate) url: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Bytes>,
    pub(crate) form_params: Vec<(String, String)>,
    pub(crate) callback: Callback,
}

impl PostRequest {
    pub fn new(url: impl Into<String>, callback: impl FnOnce(Result<Response, TransferError>) + Send + 'static) -> Self {
        Self {
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            form_params: Vec::new(),
            callback: Box::new(callback),
        }
    }

    /// Adds a request header. Names compare case-insensitively and the last
    /// write wins.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds a form parameter.
    pub fn form_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        upsert_pair(&mut self.form_params, name.into(), value.into());
        self
    }
}

impl fmt::Debug for PostRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostRequest")
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("form_params", &self.form_params)
            .finish_non_exhaustive()
    }
}

/// Replaces the value of an existing key in place, or appends a new pair.
fn upsert_pair(pairs: &mut Vec<(String, String)>, name: String, value: String) {
    match pairs.iter_mut().find(|(stored, _)| *stored == name) {
        Some((_, stored_value)) => *stored_value = value,
        None => pairs.push((name, value)),
    }
}
