//! Middleware modules and the directory that resolves their names.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::Error;
use crate::request::Request;

/// What a middleware module sees when it registers on a live request.
///
/// Deliberately a struct rather than a bare `&mut Request`: future fields
/// (response access, peer address) can be added without touching every
/// `Registrable` implementation.
pub struct Context<'r> {
    /// The request currently travelling through the pipeline.
    pub request: &'r mut Request,
}

/// A middleware module's registration interface.
///
/// One instance is constructed per `middleware()` call naming the module,
/// and its `register` runs once per request thereafter. `register` observes
/// and mutates the request and reads its options; it does **not** control
/// continuation — the loader's generated wrapper always passes control to
/// the next handler after `register` returns.
pub trait Registrable: Send + Sync {
    fn register(&self, ctx: &mut Context<'_>, options: Option<&Value>);
}

/// Produces a module instance, or a reason the module is unusable.
type Factory = Box<dyn Fn() -> Result<Box<dyn Registrable>, String> + Send + Sync>;

/// A directory of middleware modules, keyed by name.
///
/// The in-process equivalent of a `middleware/` folder: the host registers
/// every module it ships at startup, and [`load`](crate::load) resolves
/// declaration names against it. Names are plain strings; `/` separators
/// are fine for nested layouts (`"auth/jwt"`).
///
/// Resolution is lazy and uncached: every `middleware()` call naming a
/// module constructs a fresh instance.
pub struct ModuleDir {
    modules: HashMap<String, Factory>,
}

impl ModuleDir {
    pub fn new() -> Self {
        Self { modules: HashMap::new() }
    }

    /// Registers a module under `name`. Returns `self` for chaining.
    ///
    /// ```rust
    /// # use trellis::{Context, ModuleDir, Registrable};
    /// # use serde_json::Value;
    /// # struct Security;
    /// # impl Registrable for Security {
    /// #     fn register(&self, _: &mut Context<'_>, _: Option<&Value>) {}
    /// # }
    /// let dir = ModuleDir::new()
    ///     .module("security", || Security)
    ///     .module("trace", || trellis::trace::Trace);
    /// ```
    pub fn module<M, F>(self, name: &str, ctor: F) -> Self
    where
        M: Registrable + 'static,
        F: Fn() -> M + Send + Sync + 'static,
    {
        self.entry(name, move || Ok(Box::new(ctor()) as Box<dyn Registrable>))
    }

    /// Registers a module whose construction can fail.
    ///
    /// The error string becomes the `reason` of the [`Error::Shape`] raised
    /// when a declaration names the module — the explicit stand-in for "the
    /// file at that path does not export a usable middleware class".
    pub fn entry<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Registrable>, String> + Send + Sync + 'static,
    {
        self.modules.insert(name.to_owned(), Box::new(factory));
        self
    }

    /// Resolves `name` to a fresh module instance.
    pub(crate) fn resolve(&self, name: &str) -> Result<Box<dyn Registrable>, Error> {
        let factory = self.modules.get(name).ok_or_else(|| Error::resolution(name))?;
        factory().map_err(|reason| Error::shape(name, reason))
    }
}

impl Default for ModuleDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::Method;

    struct Marker;

    impl Registrable for Marker {
        fn register(&self, ctx: &mut Context<'_>, _options: Option<&Value>) {
            ctx.request.set("marked", true);
        }
    }

    #[test]
    fn unknown_name_is_a_resolution_error() {
        let dir = ModuleDir::new();
        assert!(matches!(dir.resolve("fake"), Err(Error::Resolution { .. })));
    }

    #[test]
    fn failing_factory_is_a_shape_error() {
        let dir = ModuleDir::new().entry("noclass", || Err("does not export a middleware class".into()));
        match dir.resolve("noclass") {
            Err(Error::Shape { name, reason }) => {
                assert_eq!(name, "noclass");
                assert_eq!(reason, "does not export a middleware class");
            }
            Err(other) => panic!("expected shape error, got {other:?}"),
            Ok(_) => panic!("expected shape error, got a module"),
        }
    }

    #[test]
    fn resolve_constructs_a_working_instance() {
        let dir = ModuleDir::new().module("marker", || Marker);
        let module = dir.resolve("marker").unwrap();

        let mut req = Request::new(Method::GET, "/");
        module.register(&mut Context { request: &mut req }, None);
        assert_eq!(req.get("marked"), Some(&Value::Bool(true)));
    }

    #[test]
    fn each_resolve_constructs_a_fresh_instance() {
        let constructed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&constructed);
        let dir = ModuleDir::new().module("marker", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Marker
        });

        dir.resolve("marker").unwrap();
        dir.resolve("marker").unwrap();
        assert_eq!(constructed.load(Ordering::SeqCst), 2);
    }
}
