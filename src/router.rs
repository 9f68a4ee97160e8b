//! Route registration and matching.
//!
//! Patterns are `/`-separated segments; a segment is either a literal or a
//! `:name` capture. A path matches a pattern when both have the same number
//! of segments, every literal is equal, and every capture meets a non-empty
//! segment.
//!
//! When several patterns of one method match a path, the one whose first
//! differing segment is a literal wins (`/users/me` beats `/users/:id`).
//! Patterns of identical shape fall back to registration order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{BoxedMiddleware, Middleware};

#[derive(Clone, Debug, Eq, PartialEq)]
enum Segment {
    Literal(String),
    Capture(String),
}

/// A compiled path pattern.
#[derive(Clone, Debug)]
pub(crate) struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    fn compile(raw: &str) -> Self {
        let segments = raw.split('/')
            .map(|seg| match seg.strip_prefix(':') {
                Some("") => panic!("invalid route `{raw}`: capture segment without a name"),
                Some(name) => Segment::Capture(name.to_owned()),
                None => Segment::Literal(seg.to_owned()),
            })
            .collect();
        Self { raw: raw.to_owned(), segments }
    }

    fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Capture(name) if !part.is_empty() => {
                    params.insert(name.clone(), part.to_owned());
                }
                _ => return None,
            }
        }
        Some(params)
    }

    /// True if `self` should win over `other` for a path both match.
    fn outranks(&self, other: &Pattern) -> bool {
        for (a, b) in self.segments.iter().zip(&other.segments) {
            match (a, b) {
                (Segment::Literal(_), Segment::Capture(_)) => return true,
                (Segment::Capture(_), Segment::Literal(_)) => return false,
                _ => {}
            }
        }
        false
    }
}

/// A registered route: handler plus its group and route middleware, in
/// that order.
pub(crate) struct Route {
    pub(crate) method: Method,
    pub(crate) pattern: Pattern,
    pub(crate) handler: BoxedHandler,
    pub(crate) middleware: Vec<BoxedMiddleware>,
}

impl Route {
    pub(crate) fn pattern(&self) -> &str { &self.pattern.raw }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.raw)
            .field("middleware", &self.middleware.len())
            .finish_non_exhaustive()
    }
}

/// Method → routes in registration order. Immutable once serving starts.
#[derive(Debug, Default)]
pub(crate) struct RouteTable {
    routes: HashMap<Method, Vec<Arc<Route>>>,
}

impl RouteTable {
    fn insert(&mut self, route: Route) {
        let routes = self.routes.entry(route.method).or_default();
        if routes.iter().any(|r| r.pattern.raw == route.pattern.raw) {
            panic!("invalid route `{} {}`: registered twice", route.method, route.pattern.raw);
        }
        routes.push(Arc::new(route));
    }

    /// Finds the route for `method` and `path` along with its captures.
    pub(crate) fn find(&self, method: Method, path: &str) -> Option<(Arc<Route>, HashMap<String, String>)> {
        let mut best: Option<(&Arc<Route>, HashMap<String, String>)> = None;
        for route in self.routes.get(&method)? {
            let Some(params) = route.pattern.matches(path) else {
                continue;
            };
            let better = match &best {
                Some((current, _)) => route.pattern.outranks(&current.pattern),
                None => true,
            };
            if better {
                best = Some((route, params));
            }
        }
        best.map(|(route, params)| (Arc::clone(route), params))
    }

    pub(crate) fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }
}

/// The application router.
///
/// Build it once at startup and hand it to a
/// [`Dispatcher`](crate::Dispatcher). Every registration returns `self`, so
/// calls chain:
///
/// ```rust,no_run
/// # use gerbang::{Context, Method, Response, Router};
/// # use gerbang::middleware::{self, Next};
/// # async fn list_users(ctx: Context) -> Response { ctx.success(()) }
/// # async fn get_user(ctx: Context) -> Response { ctx.success(()) }
/// # async fn create_user(ctx: Context) -> Response { ctx.success(()) }
/// # async fn audit(ctx: Context, next: Next) -> Response { next.run(ctx).await }
/// # async fn admin_only(ctx: Context, next: Next) -> Response { next.run(ctx).await }
/// Router::new()
///     .get("/health", list_users)
///     .group("/users", |users| {
///         users
///             .wrap(audit)
///             .get("", list_users)
///             .get("/:id", get_user)
///             .on_with(Method::Post, "", create_user, vec![middleware::boxed(admin_only)])
///     });
/// ```
///
/// # Panics
///
/// Registration panics on a pattern registered twice for the same method
/// and on a `:` segment without a name.
pub struct Router {
    prefix: String,
    middleware: Vec<BoxedMiddleware>,
    table: RouteTable,
}

impl Router {
    pub fn new() -> Self {
        Self { prefix: String::new(), middleware: Vec::new(), table: RouteTable::default() }
    }

    /// Register a handler for a method + pattern pair.
    pub fn on(self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        self.on_with(method, pattern, handler, Vec::new())
    }

    /// Like [`on`](Self::on), with middleware that only this route runs,
    /// after the group's.
    pub fn on_with(
        mut self,
        method: Method,
        pattern: &str,
        handler: impl Handler,
        middleware: Vec<BoxedMiddleware>,
    ) -> Self {
        let full = format!("{}{pattern}", self.prefix);
        let mut chain = self.middleware.clone();
        chain.extend(middleware);

        self.table.insert(Route {
            method,
            pattern: Pattern::compile(&full),
            handler: handler.into_boxed_handler(),
            middleware: chain,
        });
        self
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, pattern, handler)
    }

    pub fn patch(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Patch, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, pattern, handler)
    }

    /// Adds group middleware. Only routes registered afterwards run it.
    pub fn wrap(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(middleware.into_boxed_middleware());
        self
    }

    /// Registers routes under `prefix`. The group starts with this router's
    /// middleware; anything it `wrap`s stays inside the group.
    pub fn group(mut self, prefix: &str, build: impl FnOnce(Router) -> Router) -> Self {
        let child = Router {
            prefix: format!("{}{prefix}", self.prefix),
            middleware: self.middleware.clone(),
            table: std::mem::take(&mut self.table),
        };
        self.table = build(child).table;
        self
    }

    pub(crate) fn into_table(self) -> RouteTable {
        self.table
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::response::Response;

    async fn noop(ctx: Context) -> Response {
        ctx.success(())
    }

    fn find(router: Router, method: Method, path: &str) -> Option<(String, HashMap<String, String>)> {
        router.into_table()
            .find(method, path)
            .map(|(route, params)| (route.pattern().to_owned(), params))
    }

    #[test]
    fn captures_bind_by_name() {
        let (pattern, params) = find(Router::new().get("/users/:id", noop), Method::Get, "/users/42").unwrap();
        assert_eq!(pattern, "/users/:id");
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn segment_count_must_match() {
        let router = || Router::new().get("/users/:id", noop);
        assert!(find(router(), Method::Get, "/users/42/x").is_none());
        assert!(find(router(), Method::Get, "/users").is_none());
        assert!(find(router(), Method::Get, "/users/").is_none());
    }

    #[test]
    fn method_must_match() {
        assert!(find(Router::new().get("/users", noop), Method::Post, "/users").is_none());
    }

    #[test]
    fn literal_outranks_capture_regardless_of_order() {
        let router = || Router::new().get("/users/:id", noop).get("/users/me", noop);
        assert_eq!(find(router(), Method::Get, "/users/me").unwrap().0, "/users/me");
        assert_eq!(find(router(), Method::Get, "/users/7").unwrap().0, "/users/:id");

        let router = Router::new().get("/:a/x", noop).get("/y/:b", noop);
        assert_eq!(find(router, Method::Get, "/y/x").unwrap().0, "/y/:b");
    }

    #[test]
    fn identical_shapes_keep_registration_order() {
        let router = Router::new().get("/files/:name", noop).get("/files/:other", noop);
        let (pattern, params) = find(router, Method::Get, "/files/a.txt").unwrap();
        assert_eq!(pattern, "/files/:name");
        assert!(params.contains_key("name"));
    }

    #[test]
    fn groups_prefix_patterns() {
        let router = Router::new()
            .group("/api", |api| api.group("/v1", |v1| v1.get("/ping", noop)))
            .get("/ping", noop);
        let table = router.into_table();
        assert_eq!(table.len(), 2);
        assert!(table.find(Method::Get, "/api/v1/ping").is_some());
        assert!(table.find(Method::Get, "/ping").is_some());
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_pattern_panics() {
        let _ = Router::new().get("/users", noop).get("/users", noop);
    }

    #[test]
    fn same_pattern_on_other_method_is_fine() {
        let table = Router::new().get("/users", noop).post("/users", noop).into_table();
        assert_eq!(table.len(), 2);
    }

    #[test]
    #[should_panic(expected = "capture segment without a name")]
    fn unnamed_capture_panics() {
        let _ = Router::new().get("/users/:", noop);
    }
}
