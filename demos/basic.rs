//! Minimal gerbang example: validated JSON and form endpoints, a route
//! group behind a token check, listing options, and localized errors.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl 'http://localhost:3000/users?page=2&limit=5&sort=-name'
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"al","email":"nope"}'
//!   curl -X POST 'http://localhost:3000/users?lang=id' \
//!        -H 'content-type: application/json' \
//!        -d '{"name":""}'
//!   curl -X POST http://localhost:3000/users/form -d 'name=budi&email=budi@mail.id&age=31'
//!   curl http://localhost:3000/admin/stats -H 'authorization: Bearer secret'

use std::sync::OnceLock;

use gerbang::errors::ids;
use gerbang::middleware::{self, CorsConfig, Next};
use gerbang::query::Pagination;
use gerbang::validation::{Schema, Validate};
use gerbang::{Context, Dispatcher, Response, Router, Server};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Default, Deserialize, Serialize)]
struct NewUser {
    name: String,
    email: Option<String>,
    #[serde(default)]
    age: i64,
}

impl Validate for NewUser {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<NewUser>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::new()
                .field("name",  "required,minlen=3,maxlen=50", |u| (&u.name).into())
                .field("email", "email",                       |u| (&u.email).into())
                .field("age",   "min=0,max=150",               |u| (&u.age).into())
                .form("name",  |u| &mut u.name)
                .form("email", |u| &mut u.email)
                .form("age",   |u| &mut u.age)
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), gerbang::Error> {
    tracing_subscriber::fmt::init();

    let router = Router::new()
        .get("/users",        list_users)
        .get("/users/:id",    get_user)
        .post("/users",       create_user)
        .post("/users/form",  create_user_form)
        .group("/admin", |admin| admin.wrap(require_token).get("/stats", stats));

    let dispatcher = Dispatcher::builtin(router)?
        .wrap(middleware::cors(CorsConfig::default()))
        .wrap(middleware::locale);

    Server::bind("0.0.0.0:3000").serve(dispatcher).await
}

// GET /users?page=&limit=&sort=
async fn list_users(ctx: Context) -> Response {
    let opts = ctx.query_options();
    let items = vec![json!({ "id": "1", "name": "alice" }), json!({ "id": "2", "name": "budi" })];
    ctx.success(Pagination::new(items, 2, &opts))
}

// GET /users/:id
async fn get_user(ctx: Context) -> Response {
    let id = ctx.param("id").unwrap_or_default().to_owned();
    ctx.success(json!({ "id": id, "name": "alice" }))
}

// POST /users (JSON)
async fn create_user(ctx: Context) -> Response {
    match ctx.bind::<NewUser>() {
        Ok(user) => ctx.success(user),
        Err(err) => ctx.bad_input(err),
    }
}

// POST /users/form (URL-encoded)
async fn create_user_form(ctx: Context) -> Response {
    match ctx.bind_form::<NewUser>() {
        Ok(user) => ctx.success(user),
        Err(err) => ctx.bad_input(err),
    }
}

// GET /admin/stats
async fn stats(ctx: Context) -> Response {
    ctx.success(json!({ "users": 2 }))
}

async fn require_token(ctx: Context, next: Next) -> Response {
    if ctx.header("authorization") != Some("Bearer secret") {
        let err = ctx.catalog().error(ids::UNAUTHORIZED_USER, None, &[]);
        return ctx.unauthorized(err);
    }
    next.run(ctx).await
}
