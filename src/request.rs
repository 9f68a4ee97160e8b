//! Incoming HTTP request type.

use std::net::SocketAddr;

use bytes::Bytes;
use tracing::debug;

use crate::method::Method;

/// An incoming request with its body fully read.
///
/// The server builds these from hyper requests. Tests and embedders can build
/// them directly and hand them to a [`Dispatcher`](crate::Dispatcher):
///
/// ```rust
/// use gerbang::{Method, Request};
///
/// let req = Request::new(Method::Post, "/users?lang=id")
///     .with_header("content-type", "application/json")
///     .with_body(r#"{"name":"budi"}"#);
///
/// assert_eq!(req.path(), "/users");
/// assert_eq!(req.query_string(), Some("lang=id"));
/// ```
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) remote_addr: Option<SocketAddr>,
}

impl Request {
    /// Builds a request for `uri` (path with an optional `?query`). The path
    /// is percent-decoded; the query is kept raw.
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (uri, None),
        };
        Self {
            method,
            path: decode_path(path),
            query,
            headers: Vec::new(),
            body: Bytes::new(),
            remote_addr: None,
        }
    }

    pub(crate) fn from_parts(parts: &http::request::Parts, method: Method, body: Bytes, remote: SocketAddr) -> Self {
        let headers = parts.headers.iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_owned(), v.to_owned()))
            })
            .collect();
        Self {
            method,
            path: decode_path(parts.uri.path()),
            query: parts.uri.query().map(str::to_owned),
            headers,
            body,
            remote_addr: Some(remote),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query_string(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Percent-decodes a request path. A path whose escapes do not decode to
/// UTF-8 is kept as received.
fn decode_path(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(path) => path.into_owned(),
        Err(e) => {
            debug!(path = raw, error = %e, "path is not valid UTF-8 once decoded, routing on the raw path");
            raw.to_owned()
        }
    }
}
