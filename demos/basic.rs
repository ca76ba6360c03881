//! Minimal trellis example — a declared middleware chain in front of JSON
//! endpoints.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -H 'x-api-key: letmein' http://localhost:3000/users/42

use serde_json::{Value, json};
use trellis::{
    Context, Method, ModuleDir, Registrable, Request, Response, Router, Server, StatusCode, load,
    trace::Trace,
};

/// Checks the `x-api-key` header against the configured key and records the
/// verdict on the request.
struct ApiKey;

impl Registrable for ApiKey {
    fn register(&self, ctx: &mut Context<'_>, options: Option<&Value>) {
        let expected = options
            .and_then(|o| o.get("key"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let presented = ctx.request.header("x-api-key").unwrap_or_default();
        ctx.request.set("authenticated", !expected.is_empty() && presented == expected);
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // The modules this application ships, registered under the names its
    // declaration uses.
    let dir = ModuleDir::new()
        .module("trace", || Trace)
        .module("auth/api-key", || ApiKey);

    let mut app = Router::new()
        .on(Method::GET, "/users/{id}", get_user);

    // The declaration: which middleware to mount, in which order. A bad
    // name or argument here stops the process before it binds the socket.
    load(|m| {
        m.middleware("trace", ())?;
        m.middleware("auth/api-key", json!({"key": "letmein"}))
    }, &mut app, &dir)
    .expect("middleware wiring failed");

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /users/{id} — only for authenticated requests.
async fn get_user(req: Request) -> Response {
    if req.get("authenticated") != Some(&json!(true)) {
        return Response::status(StatusCode::UNAUTHORIZED);
    }
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}
