//! # trellis
//!
//! A minimal HTTP pipeline with declarative, name-based middleware loading.
//!
//! ## The contract
//!
//! An application does not wire its middleware by hand. It ships a directory
//! of named middleware modules, writes one declaration function saying which
//! of them to mount and in what order, and hands both to [`load`]. The loader
//! resolves every name, constructs the module, and mounts its handler on the
//! pipeline — in exact call order, depth-first through nested groups. Any
//! unknown name, malformed module, or invalid argument fails the whole pass
//! before the server ever binds a socket.
//!
//! Everything around the loader is deliberately thin: radix-tree routing via
//! [`matchit`], async I/O on tokio + hyper, graceful SIGTERM shutdown. TLS,
//! rate limiting, and body-size limits belong to the reverse proxy in front.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use trellis::{Method, ModuleDir, Request, Response, Router, Server, load, trace::Trace};
//!
//! #[tokio::main]
//! async fn main() {
//!     let dir = ModuleDir::new()
//!         .module("trace", || Trace);
//!
//!     let mut app = Router::new()
//!         .on(Method::GET, "/users/{id}", get_user);
//!
//!     load(|m| {
//!         m.middleware("trace", ())
//!     }, &mut app, &dir).expect("middleware wiring failed");
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

mod middleware;

pub use error::Error;
pub use handler::Handler;
pub use middleware::{
    Context, Group, Loader, MiddlewareFn, ModuleDir, Pipeline, Registrable, Target, With, load,
    trace,
};
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use router::Router;
pub use server::Server;

// Re-exported so handlers and tests can name methods and status codes
// without depending on `http` directly.
pub use http::{Method, StatusCode};
