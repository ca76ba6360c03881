//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::Method;
use serde_json::Value;

/// An incoming HTTP request.
///
/// Besides the wire data (method, path, headers, body) a request carries two
/// maps handlers read from:
///
/// - **params** — path parameters captured by the router (`/users/{id}`).
/// - **vars** — values attached by middleware. A middleware that
///   authenticates a request stores the user here; the handler reads it
///   back with [`Request::get`].
pub struct Request {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Bytes,
    params: HashMap<String, String>,
    vars: HashMap<String, Value>,
}

impl Request {
    /// Constructs a request by hand.
    ///
    /// The server builds requests from the wire; this constructor exists for
    /// code that drives a [`Router`](crate::Router) directly — tests,
    /// examples, custom hosts.
    ///
    /// ```rust
    /// use trellis::{Method, Request};
    ///
    /// let req = Request::new(Method::POST, "/users")
    ///     .with_header("content-type", "application/json")
    ///     .with_body(br#"{"name":"alice"}"#.to_vec());
    /// ```
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Bytes::new(),
            params: HashMap::new(),
            vars: HashMap::new(),
        }
    }

    /// Appends a header. Returns `self` for chaining.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body. Returns `self` for chaining.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns a request variable previously stored by middleware.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    /// Stores a request variable. Overwrites any previous value under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(key.into(), value.into());
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}
