//! Radix-tree request router with a middleware chain in front.
//!
//! One tree per HTTP method, O(path-length) lookup via [`matchit`]. The
//! middleware chain mounted through [`load`](crate::load) (or
//! [`Pipeline::mount`]) runs before routing, in mount order, for every
//! request — including ones that end in a 404.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{MiddlewareFn, Pipeline};
use crate::request::Request;
use crate::response::Response;

/// The application router: the middleware loader's default [`Pipeline`]
/// target and the server's dispatch table.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each [`Router::on`] call returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    chain: Vec<MiddlewareFn>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), chain: Vec::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use trellis::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Runs one request through the middleware chain and the matched handler.
    ///
    /// This is the whole per-request story: every mounted middleware mutates
    /// the request in mount order, then the route handler (or a bare 404)
    /// produces the response. The server calls this for you; tests and
    /// custom hosts can call it directly.
    pub async fn respond(&self, mut req: Request) -> Response {
        for middleware in &self.chain {
            middleware(&mut req);
        }

        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.set_params(params);
                handler.call(req).await
            }
            None => Response::status(StatusCode::NOT_FOUND),
        }
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Pipeline for Router {
    fn mount(&mut self, middleware: MiddlewareFn) {
        self.chain.push(middleware);
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
