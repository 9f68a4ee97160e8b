//! Per-request handle given to middleware and handlers.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as Json;
use tracing::debug;

use crate::errors::{ApiError, Catalog};
use crate::locale::Locale;
use crate::method::Method;
use crate::query::QueryOptions;
use crate::reply::{self, Outcome};
use crate::request::Request;
use crate::response::Response;
use crate::validation::{self, RuleRegistry, Validate};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Opaque per-request session storage, attached by middleware.
pub trait Session: Send + Sync {
    fn get(&self, key: &str) -> Option<Json>;
    fn set(&self, key: &str, value: Json);
    fn delete(&self, key: &str);
}

/// Everything a handler needs for one request.
///
/// Created by the dispatcher, moved through the middleware chain, and
/// consumed by exactly one response helper. The helpers take `self`, so a
/// status can only ever be chosen once.
///
/// ```rust,no_run
/// use gerbang::{Context, Response};
/// use serde_json::json;
///
/// async fn get_user(ctx: Context) -> Response {
///     if ctx.param("id") == Some("42") {
///         return ctx.success(json!({ "id": 42 }));
///     }
///     let err = ctx.catalog().error("ErrUserNotFound", None, &[]);
///     ctx.bad_input(err)
/// }
/// ```
pub struct Context {
    request: Request,
    params: HashMap<String, String>,
    locale: Locale,
    locale_pinned: bool,
    session: Option<Arc<dyn Session>>,
    catalog: Arc<Catalog>,
    rules: Arc<RuleRegistry>,
}

impl Context {
    pub(crate) fn new(
        request: Request,
        params: HashMap<String, String>,
        catalog: Arc<Catalog>,
        rules: Arc<RuleRegistry>,
    ) -> Self {
        Self {
            request,
            params,
            locale: Locale::DEFAULT,
            locale_pinned: false,
            session: None,
            catalog,
            rules,
        }
    }

    pub fn request(&self) -> &Request { &self.request }
    pub fn method(&self) -> Method { self.request.method() }
    pub fn path(&self) -> &str { self.request.path() }
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.request.remote_addr() }

    /// Returns a named path capture.
    ///
    /// For a route `/users/:id`, `ctx.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> { &self.params }

    /// First value of query parameter `name`, decoded.
    pub fn query(&self, name: &str) -> Option<String> {
        self.query_pairs().into_iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Case-insensitive request header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    pub fn locale(&self) -> Locale { self.locale }

    /// Selects the locale for this request's messages. Only the first call
    /// takes effect; returns whether this one did.
    pub fn use_locale(&mut self, locale: Locale) -> bool {
        if self.locale_pinned {
            return false;
        }
        self.locale = locale;
        self.locale_pinned = true;
        true
    }

    pub fn session(&self) -> Option<&dyn Session> {
        self.session.as_deref()
    }

    pub fn set_session(&mut self, session: Arc<dyn Session>) {
        self.session = Some(session);
    }

    /// The boot-time error catalog, for building domain errors.
    pub fn catalog(&self) -> &Catalog { &self.catalog }

    pub fn rules(&self) -> &RuleRegistry { &self.rules }

    /// Listing options (`page`, `limit`, `sort`, ...) from the query string.
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions::from_pairs(&self.query_pairs())
    }

    /// Decodes the JSON body into `T` and validates it.
    ///
    /// A malformed body is an [`ApiError::Plain`]; failed rules are an
    /// [`ApiError::Aggregate`].
    pub fn bind<T: DeserializeOwned + Validate>(&self) -> Result<T, ApiError> {
        let record: T = serde_json::from_slice(self.request.body())?;
        self.validate(&record)?;
        Ok(record)
    }

    /// Fills a default `T` from URL-encoded form values and validates it.
    ///
    /// Body values come before query values, and the first value of a key
    /// wins. Values that fail to coerce into their field are skipped.
    pub fn bind_form<T: Validate + Default>(&self) -> Result<T, ApiError> {
        let mut values = self.form_body()?;
        values.extend(self.query_pairs());

        let mut record = T::default();
        validation::bind_form(&mut record, &values);
        self.validate(&record)?;
        Ok(record)
    }

    pub fn validate<T: Validate>(&self, record: &T) -> Result<(), ApiError> {
        self.rules.validate(record).map_err(ApiError::Aggregate)
    }

    /// Writes `value` as the JSON body with `status`, outside any envelope.
    pub fn json(self, status: StatusCode, value: &impl Serialize) -> Response {
        match serde_json::to_value(value) {
            Ok(body) => reply::json(status, &body),
            Err(e) => self.server_error(e),
        }
    }

    /// `200` with `{"code":"200","data":<data>}`.
    pub fn success(self, data: impl Serialize) -> Response {
        match serde_json::to_value(data) {
            Ok(data) => reply::success(data),
            Err(e) => self.server_error(e),
        }
    }

    /// Coded errors keep their own status; anything else is `401`.
    pub fn unauthorized(self, err: impl Into<ApiError>) -> Response {
        self.fail(Outcome::Unauthorized, err.into())
    }

    /// Coded errors keep their own status; validation aggregates and anything
    /// else are `400`.
    pub fn bad_input(self, err: impl Into<ApiError>) -> Response {
        self.fail(Outcome::BadInput, err.into())
    }

    /// Coded errors keep their own status; anything else is `405`.
    pub fn not_allowed(self, err: impl Into<ApiError>) -> Response {
        self.fail(Outcome::NotAllowed, err.into())
    }

    /// Coded errors keep their own status; anything else is `502`.
    pub fn bad_gateway(self, err: impl Into<ApiError>) -> Response {
        self.fail(Outcome::BadGateway, err.into())
    }

    /// Coded errors keep their own status; anything else is `500`, with the
    /// description under `error` instead of `data`.
    pub fn server_error(self, err: impl Into<ApiError>) -> Response {
        self.fail(Outcome::ServerError, err.into())
    }

    fn fail(self, outcome: Outcome, err: ApiError) -> Response {
        reply::failure(outcome, err, self.locale)
    }

    fn query_pairs(&self) -> Vec<(String, String)> {
        let Some(query) = self.request.query_string() else {
            return Vec::new();
        };
        serde_urlencoded::from_str(query).unwrap_or_else(|e| {
            debug!(error = %e, "ignoring unparsable query string");
            Vec::new()
        })
    }

    fn form_body(&self) -> Result<Vec<(String, String)>, ApiError> {
        let is_form = self.header("content-type")
            .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE));
        if !is_form || self.request.body().is_empty() {
            return Ok(Vec::new());
        }
        serde_urlencoded::from_bytes(self.request.body()).map_err(ApiError::plain)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", &self.request.method())
            .field("path", &self.request.path())
            .field("params", &self.params)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

/// Builds a context without going through a dispatcher.
#[cfg(test)]
pub(crate) fn test_context(request: Request) -> Context {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let rules = Arc::new(RuleRegistry::builtin(&catalog).unwrap());
    Context::new(request, HashMap::new(), catalog, rules)
}
