//! Built-in request-trace middleware.
//!
//! Emits one `tracing` event per request with method and path. Register it
//! in your [`ModuleDir`](crate::ModuleDir) under whatever name your
//! declarations use:
//!
//! ```rust
//! use trellis::{ModuleDir, trace::Trace};
//!
//! let dir = ModuleDir::new().module("trace", || Trace);
//! ```

use serde_json::Value;
use tracing::info;

use super::registry::{Context, Registrable};

/// Logs `method` and `path` for every request that enters the pipeline.
pub struct Trace;

impl Registrable for Trace {
    fn register(&self, ctx: &mut Context<'_>, _options: Option<&Value>) {
        info!(method = %ctx.request.method(), path = ctx.request.path(), "request");
    }
}
