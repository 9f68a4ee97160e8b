use std::sync::Arc;

use http::StatusCode;

use super::{Middleware, Next};
use crate::context::Context;
use crate::method::Method;
use crate::response::Response;

/// Cross-origin policy for [`cors`].
#[derive(Clone, Debug)]
pub struct CorsConfig {
    /// Allowed `Origin` values; `*` allows any.
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec!["*".to_owned()],
            allow_methods: ["GET", "POST", "OPTIONS"].map(str::to_owned).to_vec(),
            allow_headers: ["Origin", "Content-Type", "Accept", "Authorization"].map(str::to_owned).to_vec(),
            allow_credentials: false,
        }
    }
}

struct Policy {
    origins: Vec<String>,
    methods: String,
    headers: String,
    credentials: &'static str,
}

impl Policy {
    fn allows(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == "*" || o == origin)
    }

    fn apply(&self, res: &mut Response, origin: Option<&str>) {
        if let Some(origin) = origin.filter(|o| !o.is_empty() && self.allows(o)) {
            res.set_header("access-control-allow-origin", origin);
        }
        res.set_header("access-control-allow-methods", &self.methods);
        res.set_header("access-control-allow-headers", &self.headers);
        res.set_header("access-control-allow-credentials", self.credentials);
    }
}

/// Adds CORS headers to every response. A matching `Origin` is echoed back.
/// `OPTIONS` requests are answered with `204` and never reach the handler.
pub fn cors(config: CorsConfig) -> impl Middleware {
    let policy = Arc::new(Policy {
        methods: config.allow_methods.join(", "),
        headers: config.allow_headers.join(", "),
        credentials: if config.allow_credentials { "true" } else { "false" },
        origins: config.allow_origins,
    });

    move |ctx: Context, next: Next| {
        let policy = Arc::clone(&policy);
        async move {
            let origin = ctx.header("origin").map(str::to_owned);
            let mut res = if ctx.method() == Method::Options {
                Response::status(StatusCode::NO_CONTENT)
            } else {
                next.run(ctx).await
            };
            policy.apply(&mut res, origin.as_deref());
            res
        }
    }
}
