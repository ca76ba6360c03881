//! The declaration loader: resolves names and mounts handlers in call order.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::request::Request;

use super::registry::{Context, ModuleDir};
use super::{MiddlewareFn, Pipeline};

/// First argument to [`Loader::middleware`]: what to mount.
///
/// Built implicitly from `&str` / `String` (a module name) or from any
/// [`Value`] — non-string values are rejected when the call is made, so a
/// declaration deserialised from untrusted config fails loudly rather than
/// mounting garbage. Ready-made handlers go through [`Target::handler`].
pub enum Target {
    /// A candidate module name. Validated at call time: must be a non-empty
    /// JSON string.
    Name(Value),
    /// A handler that needs no resolution, mounted as-is.
    Handler(MiddlewareFn),
}

impl Target {
    /// Wraps a plain function as a ready-made middleware handler.
    pub fn handler(f: impl Fn(&mut Request) + Send + Sync + 'static) -> Self {
        Self::Handler(Arc::new(f))
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Self::Name(Value::String(name.to_owned()))
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Self::Name(Value::String(name))
    }
}

impl From<Value> for Target {
    fn from(value: Value) -> Self {
        Self::Name(value)
    }
}

/// Second argument to [`Loader::middleware`]: how to mount it.
///
/// Built implicitly from `()` (nothing) or from any [`Value`] (an options
/// candidate, validated at call time). Nested groups go through
/// [`With::group`].
pub enum With {
    /// No options.
    None,
    /// A candidate options value. Validated at call time: must be a JSON
    /// object, or null (treated as absent).
    Options(Value),
    /// A nested declaration, executed depth-first right after the named
    /// module mounts.
    Group(Group),
}

/// A boxed nested declaration, as held by [`With::Group`].
pub type Group = Box<dyn FnOnce(&mut Loader<'_>) -> Result<(), Error>>;

impl With {
    /// Declares a nested group under a named middleware.
    pub fn group(defn: impl FnOnce(&mut Loader<'_>) -> Result<(), Error> + 'static) -> Self {
        Self::Group(Box::new(defn))
    }
}

impl From<()> for With {
    fn from(_: ()) -> Self {
        Self::None
    }
}

impl From<Value> for With {
    fn from(value: Value) -> Self {
        Self::Options(value)
    }
}

/// The execution context a declaration function runs with.
///
/// Created by [`load`], one per declaration invocation. Nested groups reuse
/// the same pipeline and module directory, so the whole declaration tree
/// mounts onto one flat chain.
pub struct Loader<'a> {
    pipeline: &'a mut dyn Pipeline,
    dir: &'a ModuleDir,
}

impl Loader<'_> {
    /// Resolves and mounts exactly one middleware.
    ///
    /// - `middleware("name", ())` — resolve `name` in the directory and
    ///   mount its handler.
    /// - `middleware("name", json!({…}))` — same, passing the options object
    ///   verbatim to the module's `register` on every request.
    /// - `middleware("name", With::group(|m| …))` — same, then run the
    ///   nested declaration so its middleware mount as siblings immediately
    ///   after.
    /// - `middleware(Target::handler(f), ())` — mount `f` directly, no
    ///   resolution. A handler takes no second argument; pairing one with
    ///   options or a group is rejected.
    ///
    /// Errors abort the whole registration pass. Handlers mounted by earlier
    /// calls stay mounted.
    pub fn middleware(
        &mut self,
        target: impl Into<Target>,
        with: impl Into<With>,
    ) -> Result<(), Error> {
        match (target.into(), with.into()) {
            (Target::Handler(f), With::None) => {
                self.pipeline.mount(f);
                Ok(())
            }
            (Target::Handler(_), _) => {
                Err(Error::validation("a handler function takes no second argument"))
            }
            (Target::Name(value), with) => {
                let name = match value {
                    Value::String(name) if !name.is_empty() => name,
                    _ => {
                        return Err(Error::validation(
                            "first argument must be a non-empty module name or a handler function",
                        ));
                    }
                };
                match with {
                    With::None | With::Options(Value::Null) => self.mount_named(&name, None),
                    With::Options(options @ Value::Object(_)) => {
                        self.mount_named(&name, Some(options))
                    }
                    With::Options(_) => Err(Error::validation("options must be a JSON object")),
                    With::Group(defn) => {
                        // Parent first, then its children as siblings.
                        self.mount_named(&name, None)?;
                        defn(self)
                    }
                }
            }
        }
    }

    fn mount_named(&mut self, name: &str, options: Option<Value>) -> Result<(), Error> {
        let module: Arc<dyn super::Registrable> = Arc::from(self.dir.resolve(name)?);
        debug!(name, "mounting middleware");

        let wrapper: MiddlewareFn = Arc::new(move |req: &mut Request| {
            module.register(&mut Context { request: req }, options.as_ref());
            // Control always returns to the chain here; modules never invoke
            // the continuation themselves.
        });
        self.pipeline.mount(wrapper);
        Ok(())
    }
}

/// Runs `defn` once against `pipeline`, resolving names in `dir`.
///
/// Each `middleware()` call inside `defn` mounts exactly one handler, in
/// call order, depth-first through nested groups. The first error aborts the
/// pass and propagates out; there is no rollback of handlers already
/// mounted, so treat an `Err` as fatal to startup.
pub fn load<F>(defn: F, pipeline: &mut dyn Pipeline, dir: &ModuleDir) -> Result<(), Error>
where
    F: FnOnce(&mut Loader<'_>) -> Result<(), Error>,
{
    let mut loader = Loader { pipeline, dir };
    defn(&mut loader)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::Registrable;
    use super::*;
    use crate::Method;

    /// Appends its name to the request's `order` var and sets `<name> = true`.
    struct Tag(&'static str);

    impl Registrable for Tag {
        fn register(&self, ctx: &mut Context<'_>, options: Option<&Value>) {
            let mut order = match ctx.request.get("order") {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            };
            order.push(json!(self.0));
            ctx.request.set("order", Value::Array(order));
            ctx.request.set(self.0, true);
            if let Some(options) = options {
                ctx.request.set(format!("{}_options", self.0), options.clone());
            }
        }
    }

    fn dir() -> ModuleDir {
        ModuleDir::new()
            .module("security", || Tag("security"))
            .module("one", || Tag("one"))
            .module("two", || Tag("two"))
            .module("three", || Tag("three"))
            .entry("noclass", || Err("does not export a middleware class".into()))
            .entry("noregister", || Err("exported class has no register method".into()))
    }

    fn run(chain: &[MiddlewareFn]) -> Request {
        let mut req = Request::new(Method::GET, "/");
        for middleware in chain {
            middleware(&mut req);
        }
        req
    }

    #[test]
    fn mounts_in_call_order() {
        let mut chain: Vec<MiddlewareFn> = Vec::new();
        load(|m| {
            m.middleware("one", ())?;
            m.middleware("two", ())?;
            m.middleware("three", ())
        }, &mut chain, &dir())
        .unwrap();

        assert_eq!(chain.len(), 3);
        let req = run(&chain);
        assert_eq!(req.get("order"), Some(&json!(["one", "two", "three"])));
    }

    #[test]
    fn group_mounts_parent_before_children() {
        let mut chain: Vec<MiddlewareFn> = Vec::new();
        load(|m| {
            m.middleware("security", With::group(|m| {
                m.middleware("one", ())?;
                m.middleware("two", ())?;
                m.middleware("three", ())
            }))
        }, &mut chain, &dir())
        .unwrap();

        assert_eq!(chain.len(), 4);
        let req = run(&chain);
        assert_eq!(
            req.get("order"),
            Some(&json!(["security", "one", "two", "three"]))
        );
    }

    #[test]
    fn options_reach_register_verbatim() {
        let mut chain: Vec<MiddlewareFn> = Vec::new();
        load(|m| m.middleware("security", json!({"enabled": true})), &mut chain, &dir()).unwrap();

        let req = run(&chain);
        assert_eq!(req.get("security_options"), Some(&json!({"enabled": true})));
    }

    #[test]
    fn null_options_mean_absent() {
        let mut chain: Vec<MiddlewareFn> = Vec::new();
        load(|m| m.middleware("security", Value::Null), &mut chain, &dir()).unwrap();

        let req = run(&chain);
        assert_eq!(req.get("security"), Some(&json!(true)));
        assert!(req.get("security_options").is_none());
    }

    #[test]
    fn raw_handler_mounts_without_resolution() {
        let mut chain: Vec<MiddlewareFn> = Vec::new();
        load(|m| {
            m.middleware(Target::handler(|req| req.set("raw", true)), ())
        }, &mut chain, &dir())
        .unwrap();

        let req = run(&chain);
        assert_eq!(req.get("raw"), Some(&json!(true)));
    }

    #[test]
    fn handler_with_second_argument_is_rejected() {
        let mut chain: Vec<MiddlewareFn> = Vec::new();
        let result = load(|m| {
            m.middleware(Target::handler(|_| {}), json!({"enabled": true}))
        }, &mut chain, &dir());

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(chain.is_empty());
    }

    #[test]
    fn missing_name_is_rejected() {
        let mut chain: Vec<MiddlewareFn> = Vec::new();
        let result = load(|m| m.middleware(Value::Null, ()), &mut chain, &dir());
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(chain.is_empty());
    }

    #[test]
    fn numeric_name_is_rejected() {
        let mut chain: Vec<MiddlewareFn> = Vec::new();
        let result = load(|m| m.middleware(json!(1), ()), &mut chain, &dir());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut chain: Vec<MiddlewareFn> = Vec::new();
        let result = load(|m| m.middleware("", ()), &mut chain, &dir());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn numeric_options_are_rejected() {
        let mut chain: Vec<MiddlewareFn> = Vec::new();
        let result = load(|m| m.middleware("security", json!(1)), &mut chain, &dir());
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(chain.is_empty());
    }

    #[test]
    fn unknown_name_aborts_the_pass() {
        let mut chain: Vec<MiddlewareFn> = Vec::new();
        let result = load(|m| {
            m.middleware("one", ())?;
            m.middleware("fake", ())?;
            m.middleware("two", ())
        }, &mut chain, &dir());

        assert!(matches!(result, Err(Error::Resolution { .. })));
        // No rollback: the handler mounted before the failure stays.
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn malformed_modules_are_shape_errors() {
        let mut chain: Vec<MiddlewareFn> = Vec::new();
        let result = load(|m| m.middleware("noclass", ()), &mut chain, &dir());
        assert!(matches!(result, Err(Error::Shape { .. })));

        let result = load(|m| m.middleware("noregister", ()), &mut chain, &dir());
        assert!(matches!(result, Err(Error::Shape { .. })));
    }

    #[test]
    fn error_inside_group_propagates() {
        let mut chain: Vec<MiddlewareFn> = Vec::new();
        let result = load(|m| {
            m.middleware("security", With::group(|m| m.middleware("fake", ())))
        }, &mut chain, &dir());

        assert!(matches!(result, Err(Error::Resolution { .. })));
        assert_eq!(chain.len(), 1); // the parent mounted before the failure
    }
}
