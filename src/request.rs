//! Report requests: validation, authentication, resolution and rendering.
//!
//! A [`Request`] is transport-neutral (method, query parameters and raw
//! body), so the same handler serves the stdio host and tests. Every outcome
//! is a [`Response`] carrying an HTTP-style status code; errors are returned
//! as `{"error": "..."}` bodies rather than Rust errors.

use std::collections::HashMap;

use carbon_resolve::{Locale, Mode, PrimaryProvider, ResolveError, Resolver, SecondaryProvider};
use serde::{Deserialize, Serialize};

use crate::accounts::{self, Caller};
use crate::config::CarbonConfig;
use crate::report::{Format, Report};

/// Query parameters every request must carry.
pub const REQUIRED_PARAMS: [&str; 4] = ["type", "format", "country", "language"];

/// A report was produced.
pub const STATUS_CREATED: u16 = 201;
/// Missing parameter, bad body, limit exceeded or unsupported type/format.
pub const STATUS_BAD_REQUEST: u16 = 400;
/// Account name without password, or credentials that do not match.
pub const STATUS_UNAUTHORIZED: u16 = 401;
/// Any method other than `POST`.
pub const STATUS_METHOD_NOT_ALLOWED: u16 = 405;
/// Resolution failed for a reason other than missing credentials.
pub const STATUS_INTERNAL_ERROR: u16 = 500;
/// No usable primary provider credential is configured.
pub const STATUS_SERVICE_UNAVAILABLE: u16 = 503;

/// An incoming report request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// HTTP method; defaults to `POST`.
    #[serde(default = "default_method")]
    pub method: String,
    /// Query parameters by name.
    #[serde(default)]
    pub params: HashMap<String, String>,
    /// JSON body: `{"values": [{"value": "..."}]}`.
    #[serde(default)]
    pub body: String,
}

fn default_method() -> String {
    "POST".to_owned()
}

impl Request {
    /// A `POST` request with the given parameters and body.
    pub fn post<'a>(
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            method: default_method(),
            params: params
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
            body: body.into(),
        }
    }

    fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// The outcome of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// HTTP-style status code.
    pub status: u16,
    /// MIME type of `body`.
    pub content_type: String,
    /// Rendered report or `{"error": "..."}` JSON.
    pub body: String,
}

impl Response {
    /// A JSON error body with `status`.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        let body = serde_json::json!({ "error": message.into() }).to_string();
        Self {
            status,
            content_type: Format::Json.content_type().to_owned(),
            body,
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Deserialize)]
struct RequestBody {
    #[serde(default)]
    values: Vec<SubmittedValue>,
}

#[derive(Debug, Deserialize)]
struct SubmittedValue {
    #[serde(default)]
    value: String,
}

/// A request that passed every check and is ready to resolve.
#[derive(Debug)]
struct Prepared {
    mode: Mode,
    format: Format,
    locale: Locale,
    values: Vec<String>,
}

/// Handle `request` with the production providers configured in `config`.
pub async fn handle(request: &Request, config: &CarbonConfig) -> Response {
    let prepared = match prepare(request, config) {
        Ok(prepared) => prepared,
        Err(response) => return response,
    };
    let result =
        carbon_resolve::resolve(&prepared.values, prepared.mode, &prepared.locale, &config.resolve)
            .await;
    respond(&prepared, result)
}

/// Handle `request` with an injected resolver.
///
/// Request checks use `config`; resolution uses the resolver's own settings.
pub async fn handle_with<P, S>(
    request: &Request,
    config: &CarbonConfig,
    resolver: &Resolver<P, S>,
) -> Response
where
    P: PrimaryProvider,
    S: SecondaryProvider,
{
    let prepared = match prepare(request, config) {
        Ok(prepared) => prepared,
        Err(response) => return response,
    };
    let result = resolver
        .resolve(&prepared.values, prepared.mode, &prepared.locale)
        .await;
    respond(&prepared, result)
}

fn prepare(request: &Request, config: &CarbonConfig) -> Result<Prepared, Response> {
    if !request.method.eq_ignore_ascii_case("POST") {
        return Err(Response::error(
            STATUS_METHOD_NOT_ALLOWED,
            "method not allowed, only POST",
        ));
    }

    for name in REQUIRED_PARAMS {
        if request.param(name).is_none() {
            return Err(Response::error(
                STATUS_BAD_REQUEST,
                format!("{name} is not set"),
            ));
        }
    }

    let caller = accounts::authenticate(
        &config.accounts,
        request.param("accountName"),
        request.param("accountPassword"),
    )
    .map_err(|err| {
        tracing::debug!(error = %err, "authentication failed");
        Response::error(STATUS_UNAUTHORIZED, err.to_string())
    })?;

    let body: RequestBody = serde_json::from_str(&request.body).map_err(|e| {
        Response::error(
            STATUS_BAD_REQUEST,
            format!("could not decode the request body: {e}"),
        )
    })?;

    caller
        .check_limit(body.values.len(), config.public_limit)
        .map_err(|message| Response::error(STATUS_BAD_REQUEST, message))?;

    let mode = parse_mode(request.param("type").unwrap_or_default(), &caller)?;

    let format = Format::parse(request.param("format").unwrap_or_default()).ok_or_else(|| {
        Response::error(STATUS_BAD_REQUEST, r#"format must be "json" or "tsv""#)
    })?;

    let locale = Locale::new(
        request.param("country").unwrap_or_default(),
        request.param("language").unwrap_or_default(),
    );

    Ok(Prepared {
        mode,
        format,
        locale,
        values: body.values.into_iter().map(|v| v.value).collect(),
    })
}

fn parse_mode(raw: &str, caller: &Caller) -> Result<Mode, Response> {
    match Mode::parse(raw) {
        Some(Mode::Url) => Ok(Mode::Url),
        Some(Mode::Keyword) if caller.is_privileged() => Ok(Mode::Keyword),
        _ if caller.is_privileged() => Err(Response::error(
            STATUS_BAD_REQUEST,
            r#"type must be "url" or "keyword""#,
        )),
        _ => Err(Response::error(STATUS_BAD_REQUEST, r#"type must be "url""#)),
    }
}

fn respond(
    prepared: &Prepared,
    result: Result<carbon_resolve::ResolutionSet, ResolveError>,
) -> Response {
    let set = match result {
        Ok(set) => set,
        Err(err @ ResolveError::NoCredentialsAvailable(_)) => {
            tracing::error!(error = %err, "no provider credentials configured");
            return Response::error(
                STATUS_SERVICE_UNAVAILABLE,
                "service unavailable, please try later",
            );
        }
        Err(err) => {
            tracing::error!(error = %err, "resolution failed");
            return Response::error(STATUS_INTERNAL_ERROR, err.to_string());
        }
    };

    tracing::info!(
        mode = %prepared.mode,
        successes = set.success_len(),
        fails = set.fail_len(),
        "request resolved"
    );

    match Report::from_set(&set).render(prepared.format) {
        Ok(body) => Response {
            status: STATUS_CREATED,
            content_type: prepared.format.content_type().to_owned(),
            body,
        },
        Err(err) => {
            tracing::error!(error = %err, "report rendering failed");
            Response::error(
                STATUS_INTERNAL_ERROR,
                "could not create the report, please try later",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{Account, UNLIMITED, hash_password};

    fn config() -> CarbonConfig {
        CarbonConfig {
            accounts: vec![Account {
                name: "seo".into(),
                password: hash_password("hunter2"),
                limit: 2,
            }],
            ..CarbonConfig::default()
        }
    }

    fn params() -> Vec<(&'static str, &'static str)> {
        vec![
            ("type", "url"),
            ("format", "json"),
            ("country", "us"),
            ("language", "en"),
        ]
    }

    fn body(n: usize) -> String {
        let values: Vec<_> = (0..n)
            .map(|i| serde_json::json!({ "value": format!("https://example.com/{i}") }))
            .collect();
        serde_json::json!({ "values": values }).to_string()
    }

    fn error_of(response: &Response) -> String {
        let value: serde_json::Value = serde_json::from_str(&response.body).expect("json");
        value["error"].as_str().unwrap_or_default().to_owned()
    }

    #[test]
    fn only_post_is_allowed() {
        let mut request = Request::post(params(), body(1));
        request.method = "GET".into();
        let err = prepare(&request, &config()).unwrap_err();
        assert_eq!(err.status, STATUS_METHOD_NOT_ALLOWED);
    }

    #[test]
    fn each_required_param_is_checked() {
        for missing in REQUIRED_PARAMS {
            let request = Request::post(
                params().into_iter().filter(|(k, _)| *k != missing),
                body(1),
            );
            let err = prepare(&request, &config()).unwrap_err();
            assert_eq!(err.status, STATUS_BAD_REQUEST);
            assert_eq!(error_of(&err), format!("{missing} is not set"));
        }
    }

    #[test]
    fn bad_credentials_are_unauthorized() {
        let mut p = params();
        p.push(("accountName", "seo"));
        let err = prepare(&Request::post(p.clone(), body(1)), &config()).unwrap_err();
        assert_eq!(err.status, STATUS_UNAUTHORIZED);

        p.push(("accountPassword", "wrong"));
        let err = prepare(&Request::post(p, body(1)), &config()).unwrap_err();
        assert_eq!(err.status, STATUS_UNAUTHORIZED);
    }

    #[test]
    fn undecodable_body_is_bad_request() {
        let err = prepare(&Request::post(params(), "{values:"), &config()).unwrap_err();
        assert_eq!(err.status, STATUS_BAD_REQUEST);
        assert!(error_of(&err).contains("request body"));
    }

    #[test]
    fn public_limit_applies() {
        let cfg = CarbonConfig {
            public_limit: 3,
            ..config()
        };
        assert!(prepare(&Request::post(params(), body(3)), &cfg).is_ok());
        let err = prepare(&Request::post(params(), body(4)), &cfg).unwrap_err();
        assert_eq!(err.status, STATUS_BAD_REQUEST);
    }

    #[test]
    fn account_limit_applies() {
        let mut p = params();
        p.push(("accountName", "seo"));
        p.push(("accountPassword", "hunter2"));
        assert!(prepare(&Request::post(p.clone(), body(2)), &config()).is_ok());
        let err = prepare(&Request::post(p.clone(), body(3)), &config()).unwrap_err();
        assert_eq!(err.status, STATUS_BAD_REQUEST);

        let mut unlimited = config();
        unlimited.accounts[0].limit = UNLIMITED;
        assert!(prepare(&Request::post(p, body(500)), &unlimited).is_ok());
    }

    #[test]
    fn keyword_type_requires_an_account() {
        let p: Vec<_> = params()
            .into_iter()
            .map(|(k, v)| if k == "type" { (k, "keyword") } else { (k, v) })
            .collect();
        let err = prepare(&Request::post(p.clone(), body(1)), &config()).unwrap_err();
        assert_eq!(err.status, STATUS_BAD_REQUEST);
        assert_eq!(error_of(&err), r#"type must be "url""#);

        let mut privileged = p;
        privileged.push(("accountName", "seo"));
        privileged.push(("accountPassword", "hunter2"));
        let prepared = prepare(&Request::post(privileged, body(1)), &config()).expect("ok");
        assert_eq!(prepared.mode, Mode::Keyword);
    }

    #[test]
    fn unknown_format_is_bad_request() {
        let p: Vec<_> = params()
            .into_iter()
            .map(|(k, v)| if k == "format" { (k, "excel") } else { (k, v) })
            .collect();
        let err = prepare(&Request::post(p, body(1)), &config()).unwrap_err();
        assert_eq!(err.status, STATUS_BAD_REQUEST);
        assert!(error_of(&err).contains("format"));
    }

    #[test]
    fn prepared_request_carries_locale_and_values() {
        let prepared = prepare(&Request::post(params(), body(2)), &config()).expect("ok");
        assert_eq!(prepared.locale, Locale::new("us", "en"));
        assert_eq!(prepared.format, Format::Json);
        assert_eq!(prepared.values.len(), 2);
    }

    #[tokio::test]
    async fn missing_credentials_is_service_unavailable() {
        let response = handle(&Request::post(params(), body(1)), &config()).await;
        assert_eq!(response.status, STATUS_SERVICE_UNAVAILABLE);
    }

    #[test]
    fn request_envelope_defaults_to_post() {
        let request: Request =
            serde_json::from_str(r#"{"params":{"type":"url"}}"#).expect("deserialize");
        assert_eq!(request.method, "POST");
        assert!(request.body.is_empty());
    }
}
