use tracing::debug;

use super::Next;
use crate::context::Context;
use crate::locale::Locale;
use crate::response::Response;

/// Switches the request locale from the `lang` query parameter.
///
/// Only the exact tags `en` and `id` are honoured; anything else leaves the
/// default in place.
pub async fn locale(mut ctx: Context, next: Next) -> Response {
    if let Some(tag) = ctx.query("lang") {
        match tag.parse::<Locale>() {
            Ok(locale) => {
                ctx.use_locale(locale);
            }
            Err(()) => debug!(lang = %tag, "unsupported locale requested, keeping default"),
        }
    }
    next.run(ctx).await
}
