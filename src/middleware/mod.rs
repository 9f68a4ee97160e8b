//! Middleware layer.
//!
//! A middleware is any `async fn(Context, Next) -> impl IntoResponse`. It may
//! inspect or change the context, call [`Next::run`] to continue, adjust the
//! response on the way out, or return early without calling `next` at all;
//! then nothing downstream runs.
//!
//! ```rust,no_run
//! use gerbang::middleware::Next;
//! use gerbang::{Context, Response};
//!
//! async fn require_token(ctx: Context, next: Next) -> Response {
//!     if ctx.header("authorization").is_none() {
//!         let err = ctx.catalog().error("ErrUnauthorizedUser", None, &[]);
//!         return ctx.unauthorized(err);
//!     }
//!     next.run(ctx).await
//! }
//! ```
//!
//! Chains run outer to inner: dispatcher-wide middleware in registration
//! order, then group middleware, then route middleware, then the handler.

mod cors;
mod locale;

use std::future::Future;
use std::sync::Arc;

pub use cors::{cors, CorsConfig};
pub use locale::locale;

use crate::context::Context;
use crate::handler::BoxFuture;
use crate::response::IntoResponse;
use crate::router::Route;

#[doc(hidden)]
pub trait ErasedMiddleware {
    fn call(&self, ctx: Context, next: Next) -> BoxFuture;
}

/// A type-erased middleware, as taken by
/// [`Router::on_with`](crate::Router::on_with).
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

/// Erases a middleware so it can sit in a list with others.
pub fn boxed(middleware: impl Middleware) -> BoxedMiddleware {
    middleware.into_boxed_middleware()
}

/// Implemented for every valid middleware function. Sealed like
/// [`Handler`](crate::Handler).
pub trait Middleware: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Middleware for F
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_middleware(self) -> BoxedMiddleware {
        Arc::new(FnMiddleware(self))
    }
}

struct FnMiddleware<F>(F);

impl<F, Fut, R> ErasedMiddleware for FnMiddleware<F>
where
    F: Fn(Context, Next) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, ctx: Context, next: Next) -> BoxFuture {
        let fut = (self.0)(ctx, next);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// The rest of the chain after the current middleware.
pub struct Next {
    global: Arc<[BoxedMiddleware]>,
    route: Arc<Route>,
    position: usize,
}

impl Next {
    pub(crate) fn new(global: Arc<[BoxedMiddleware]>, route: Arc<Route>) -> Self {
        Self { global, route, position: 0 }
    }

    /// Runs the next middleware, or the handler once the chain is exhausted.
    pub fn run(mut self, ctx: Context) -> BoxFuture {
        let stage = match self.global.get(self.position) {
            Some(mw) => Some(Arc::clone(mw)),
            None => self.route.middleware.get(self.position - self.global.len()).cloned(),
        };
        match stage {
            Some(mw) => {
                self.position += 1;
                mw.call(ctx, self)
            }
            None => self.route.handler.call(ctx),
        }
    }
}
