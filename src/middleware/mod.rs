//! Middleware layer: declarative, name-based middleware loading.
//!
//! Middleware intercepts requests before routing and is the right place for
//! cross-cutting concerns: request-id injection, authentication-header
//! inspection, body parsing, tracing.
//!
//! Instead of wiring middleware imperatively, an application describes its
//! chain with a *declaration function* and lets [`load`] do the wiring.
//! Names are resolved in a [`ModuleDir`] — a directory of middleware modules
//! the host registers at startup — and each resolved module is mounted on
//! the target [`Pipeline`] in exact call order, depth-first through nested
//! groups:
//!
//! ```rust
//! use trellis::{load, Context, ModuleDir, Registrable, Router};
//! use serde_json::{json, Value};
//!
//! struct Security;
//!
//! impl Registrable for Security {
//!     fn register(&self, ctx: &mut Context<'_>, options: Option<&Value>) {
//!         ctx.request.set("authenticated", true);
//!         if let Some(options) = options {
//!             ctx.request.set("security_options", options.clone());
//!         }
//!     }
//! }
//!
//! let dir = ModuleDir::new().module("security", || Security);
//! let mut app = Router::new();
//!
//! load(|m| {
//!     m.middleware("security", json!({"enabled": true}))?;
//!     Ok(())
//! }, &mut app, &dir).expect("middleware wiring failed");
//! ```
//!
//! Loading is synchronous and runs once at startup. Any error — an unknown
//! name, a malformed module, an invalid argument — aborts the pass and
//! propagates out of [`load`], so a misdeclared application fails before it
//! ever binds a socket. Handlers mounted before the failing call stay
//! mounted; detect failure from the returned `Err`, not from pipeline state.

mod loader;
mod registry;

pub mod trace;

pub use loader::{Group, Loader, Target, With, load};
pub use registry::{Context, ModuleDir, Registrable};

use std::sync::Arc;

use crate::request::Request;

/// The mountable form of one middleware.
///
/// Called once per request, in mount order, before routing. Middleware
/// observes and mutates the [`Request`]; the chain always continues to the
/// next entry after the call returns.
pub type MiddlewareFn = Arc<dyn Fn(&mut Request) + Send + Sync + 'static>;

/// An ordered, append-only middleware chain.
///
/// This is the loader's only requirement on its target: accept handlers one
/// at a time and preserve the order. [`Router`](crate::Router) implements it;
/// so does a bare `Vec<MiddlewareFn>` for hosts that run their own dispatch
/// loop.
pub trait Pipeline {
    /// Appends `middleware` to the end of the chain.
    fn mount(&mut self, middleware: MiddlewareFn);
}

impl Pipeline for Vec<MiddlewareFn> {
    fn mount(&mut self, middleware: MiddlewareFn) {
        self.push(middleware);
    }
}
