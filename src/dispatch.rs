//! Request dispatch: route lookup, chain assembly, panic containment and the
//! per-request log line.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use http::StatusCode;
use tracing::{error, info, trace};

use crate::context::Context;
use crate::error::Error;
use crate::errors::{ApiError, Catalog};
use crate::locale::Locale;
use crate::middleware::{BoxedMiddleware, Middleware, Next};
use crate::reply::{self, Outcome};
use crate::request::Request;
use crate::response::Response;
use crate::router::{RouteTable, Router};
use crate::validation::RuleRegistry;

const NOT_FOUND: &str = "not found";
const PANIC_MESSAGE: &str = "internal panic recover";

/// Turns [`Request`]s into [`Response`]s.
///
/// Owns the route table, the dispatcher-wide middleware and the boot-time
/// catalog and rule registry that every [`Context`] shares. The
/// [`Server`](crate::Server) drives it from the network; tests can drive it
/// directly.
pub struct Dispatcher {
    table: RouteTable,
    global: Arc<[BoxedMiddleware]>,
    catalog: Arc<Catalog>,
    rules: Arc<RuleRegistry>,
}

impl Dispatcher {
    pub fn new(router: Router, catalog: Catalog, rules: RuleRegistry) -> Self {
        let table = router.into_table();
        info!(routes = table.len(), errors = catalog.len(), rules = rules.len(), "dispatcher ready");
        Self {
            table,
            global: Arc::new([]),
            catalog: Arc::new(catalog),
            rules: Arc::new(rules),
        }
    }

    /// Builds a dispatcher on the embedded catalog and the built-in rules.
    pub fn builtin(router: Router) -> Result<Self, Error> {
        let catalog = Catalog::builtin()?;
        let rules = RuleRegistry::builtin(&catalog)?;
        Ok(Self::new(router, catalog, rules))
    }

    /// Adds middleware that runs for every matched route, before group and
    /// route middleware.
    pub fn wrap(mut self, middleware: impl Middleware) -> Self {
        let mut global = self.global.to_vec();
        global.push(middleware.into_boxed_middleware());
        self.global = global.into();
        self
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }
    pub fn rules(&self) -> &RuleRegistry { &self.rules }

    /// Handles one request.
    ///
    /// Unmatched paths get `404`. A panic anywhere in the chain is contained
    /// and answered with the uncoded server-error envelope.
    pub async fn dispatch(&self, request: Request) -> Response {
        let start = Instant::now();
        let method = request.method();
        let path = request.path().to_owned();
        let remote = request.remote_addr().map_or_else(|| "-".to_owned(), |addr| addr.to_string());

        let response = match self.table.find(method, &path) {
            None => Response::builder()
                .status(StatusCode::NOT_FOUND)
                .text(NOT_FOUND)
                .with_failure(NOT_FOUND),
            Some((route, params)) => {
                trace!(pattern = route.pattern(), "route matched");
                let ctx = Context::new(request, params, Arc::clone(&self.catalog), Arc::clone(&self.rules));
                let next = Next::new(Arc::clone(&self.global), route);
                let chain = AssertUnwindSafe(async move { next.run(ctx).await });

                match chain.catch_unwind().await {
                    Ok(response) => response,
                    Err(payload) => {
                        error!(method = %method, path = %path, panic = %panic_text(payload.as_ref()), "handler panicked");
                        reply::failure(Outcome::ServerError, ApiError::plain(PANIC_MESSAGE), Locale::DEFAULT)
                    }
                }
            }
        };

        info!(
            method = %method,
            status = response.status_code().as_u16(),
            path = %path,
            remote = %remote,
            message = response.failure().unwrap_or("success"),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "request handled"
        );
        response
    }
}

fn panic_text(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value as Json};

    use super::*;
    use crate::method::Method;

    fn body(res: &Response) -> Json {
        serde_json::from_slice(res.body()).unwrap()
    }

    async fn hello(ctx: Context) -> Response {
        let name = ctx.param("name").unwrap_or_default().to_owned();
        ctx.success(json!({ "hello": name }))
    }

    #[tokio::test]
    async fn unmatched_path_is_not_found() {
        let dispatcher = Dispatcher::builtin(Router::new().get("/hello/:name", hello)).unwrap();
        let res = dispatcher.dispatch(Request::new(Method::Get, "/bye/you")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(res.failure(), Some(NOT_FOUND));
    }

    #[tokio::test]
    async fn matched_path_reaches_handler_with_params() {
        let dispatcher = Dispatcher::builtin(Router::new().get("/hello/:name", hello)).unwrap();
        let res = dispatcher.dispatch(Request::new(Method::Get, "/hello/budi")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(body(&res), json!({ "code": "200", "data": { "hello": "budi" } }));
        assert_eq!(res.failure(), None);
    }

    #[tokio::test]
    async fn panics_become_server_errors() {
        async fn boom(_ctx: Context) -> Response {
            panic!("kaboom")
        }
        let dispatcher = Dispatcher::builtin(Router::new().get("/boom", boom)).unwrap();
        let res = dispatcher.dispatch(Request::new(Method::Get, "/boom")).await;
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body(&res),
            json!({ "code": "500", "error": { "description": "general server error: internal panic recover" } }),
        );
    }

    #[test]
    fn panic_payload_text() {
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_text(payload.as_ref()), "owned");
        let payload: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_text(payload.as_ref()), "non-string panic payload");
    }
}
