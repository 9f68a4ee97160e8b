//! # gerbang
//!
//! Request-handling core for JSON API backends: a router with middleware
//! chains, a per-request [`Context`] with enveloped response helpers, a
//! rule-based validation engine, and a catalog of coded errors localized in
//! English and Bahasa Indonesia.
//!
//! - Routing: `/`-separated patterns with `:name` captures, route groups,
//!   dispatcher, group and route middleware
//! - Validation: per-type [`Schema`](validation::Schema)s, named rules from a
//!   [`RuleRegistry`](validation::RuleRegistry), nested records, form binding
//! - Errors: one boot-time [`Catalog`](errors::Catalog) of identifiers with
//!   status, numeric code and per-locale templates
//! - Serving: hyper on tokio, graceful shutdown on SIGTERM / Ctrl-C, panics
//!   contained per request
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::OnceLock;
//!
//! use gerbang::validation::{Schema, Validate};
//! use gerbang::{middleware, Context, Dispatcher, Response, Router, Server};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct NewUser {
//!     name: String,
//!     email: String,
//! }
//!
//! impl Validate for NewUser {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: OnceLock<Schema<NewUser>> = OnceLock::new();
//!         SCHEMA.get_or_init(|| {
//!             Schema::<Self>::new()
//!                 .field("name", "required,minlen=3", |u| (&u.name).into())
//!                 .field("email", "required,email", |u| (&u.email).into())
//!         })
//!     }
//! }
//!
//! async fn create_user(ctx: Context) -> Response {
//!     match ctx.bind::<NewUser>() {
//!         Ok(user) => ctx.success(serde_json::json!({ "name": user.name })),
//!         Err(err) => ctx.bad_input(err),
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gerbang::Error> {
//!     let router = Router::new().post("/users", create_user);
//!     let dispatcher = Dispatcher::builtin(router)?.wrap(middleware::locale);
//!
//!     Server::bind("0.0.0.0:3000").serve(dispatcher).await
//! }
//! ```

mod context;
mod dispatch;
mod error;
mod handler;
mod method;
mod reply;
mod request;
mod response;
mod router;
mod server;

pub mod errors;
pub mod locale;
pub mod middleware;
pub mod query;
pub mod validation;

pub use context::{Context, Session};
pub use dispatch::Dispatcher;
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use locale::Locale;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
