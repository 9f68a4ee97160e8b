//! JSON envelopes shared by every response helper.
//!
//! ```text
//! success        {"code":"200","data":<payload>}
//! coded error    {"code":"<code>","data":{"description":"<localized>"}}
//! aggregate      {"code":"400","data":{"<field>":"<localized>", ...}}
//! plain error    {"code":"<status>","data":{"description":"general <kind> error: <text>"}}
//! server error   {"code":"500","error":{"description":"general server error: <text>"}}
//! ```

use http::StatusCode;
use serde_json::{json, Value as Json};

use crate::errors::{ApiError, CodedError};
use crate::locale::Locale;
use crate::response::Response;

/// Which helper a failure went through. Decides the fallback status and the
/// wording for errors that carry no code.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Outcome {
    Unauthorized,
    BadInput,
    NotAllowed,
    BadGateway,
    ServerError,
}

impl Outcome {
    fn status(self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadInput     => StatusCode::BAD_REQUEST,
            Self::NotAllowed   => StatusCode::METHOD_NOT_ALLOWED,
            Self::BadGateway   => StatusCode::BAD_GATEWAY,
            Self::ServerError  => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(self) -> &'static str {
        match self {
            // Misspelled on the wire; clients match this exact text.
            Self::Unauthorized => "unautorized",
            Self::BadInput     => "input",
            Self::NotAllowed   => "not allowed",
            Self::BadGateway   => "bad gateway",
            Self::ServerError  => "server",
        }
    }

    /// Only uncoded server errors put the description under `error`.
    fn body_key(self) -> &'static str {
        match self {
            Self::ServerError => "error",
            _                 => "data",
        }
    }
}

/// Serializes `body` as the response payload with `status`.
pub(crate) fn json(status: StatusCode, body: &Json) -> Response {
    Response::builder().status(status).json(body.to_string())
}

pub(crate) fn success(data: Json) -> Response {
    json(StatusCode::OK, &json!({ "code": code_of(StatusCode::OK), "data": data }))
}

/// Maps `err` onto the envelope and status for `outcome`.
pub(crate) fn failure(outcome: Outcome, err: ApiError, locale: Locale) -> Response {
    let message = err.to_string();
    let res = match err {
        ApiError::Coded(coded) => mapped(&coded, locale),
        ApiError::Aggregate(errs) if outcome == Outcome::BadInput => {
            let status = StatusCode::BAD_REQUEST;
            json(status, &json!({ "code": code_of(status), "data": errs.localized(locale) }))
        }
        ApiError::Aggregate(_) | ApiError::Plain(_) => generic(outcome, &message),
    };
    res.with_failure(message)
}

fn mapped(err: &CodedError, locale: Locale) -> Response {
    json(
        err.status(),
        &json!({
            "code": err.code().to_string(),
            "data": { "description": err.localized(locale) },
        }),
    )
}

fn generic(outcome: Outcome, message: &str) -> Response {
    let status = outcome.status();
    let description = format!("general {} error: {message}", outcome.kind());

    let mut body = serde_json::Map::new();
    body.insert("code".to_owned(), Json::String(code_of(status)));
    body.insert(outcome.body_key().to_owned(), json!({ "description": description }));
    json(status, &Json::Object(body))
}

fn code_of(status: StatusCode) -> String {
    status.as_u16().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ids, Aggregate, Catalog};

    fn body(res: &Response) -> Json {
        serde_json::from_slice(res.body()).unwrap()
    }

    #[test]
    fn success_wraps_payload() {
        let res = success(json!({ "id": 7 }));
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(body(&res), json!({ "code": "200", "data": { "id": 7 } }));
        assert_eq!(res.failure(), None);
    }

    #[test]
    fn coded_errors_use_their_own_status_whatever_the_helper() {
        let catalog = Catalog::builtin().unwrap();
        let err = catalog.template(ids::EXPIRED_TOKEN).unwrap().error();

        let res = failure(Outcome::ServerError, err.clone().into(), Locale::English);
        assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(body(&res)["code"], json!(err.code().to_string()));
        assert_eq!(body(&res)["data"]["description"], json!(err.localized(Locale::English)));
    }

    #[test]
    fn aggregates_are_field_maps_only_for_bad_input() {
        let catalog = Catalog::builtin().unwrap();
        let mut errs = Aggregate::new();
        errs.insert("name", catalog.template(ids::FIELD_REQUIRED).unwrap().error());

        let res = failure(Outcome::BadInput, errs.clone().into(), Locale::Bahasa);
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(body(&res), json!({ "code": "400", "data": { "name": "wajib diisi" } }));

        let res = failure(Outcome::NotAllowed, errs.into(), Locale::Bahasa);
        assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body(&res)["data"]["description"],
            json!("general not allowed error: name: field is required."),
        );
    }

    #[test]
    fn plain_errors_take_the_helper_default() {
        let cases = [
            (Outcome::Unauthorized, 401, "data", "general unautorized error: boom"),
            (Outcome::BadInput, 400, "data", "general input error: boom"),
            (Outcome::NotAllowed, 405, "data", "general not allowed error: boom"),
            (Outcome::BadGateway, 502, "data", "general bad gateway error: boom"),
            (Outcome::ServerError, 500, "error", "general server error: boom"),
        ];
        for (outcome, status, key, description) in cases {
            let res = failure(outcome, ApiError::plain("boom"), Locale::English);
            assert_eq!(res.status_code().as_u16(), status);
            let body = body(&res);
            assert_eq!(body["code"], json!(status.to_string()));
            assert_eq!(body[key]["description"], json!(description));
            assert_eq!(res.failure(), Some("boom"));
        }
    }

    #[test]
    fn server_error_envelope_has_no_data_key() {
        let res = failure(Outcome::ServerError, ApiError::plain("db down"), Locale::English);
        let body = body(&res);
        assert!(body.get("data").is_none());
        assert!(body.get("error").is_some());
    }
}
