use async_trait::async_trait;
use reqwest::header::{HeaderMap, SET_COOKIE, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde_json::{json, Map, Value};

use super::{transport_failure, ReconModule};
use crate::context::RequestContext;
use crate::result::ModuleResult;

const NAME: &str = "headers";

/// Security-relevant response headers flagged present or absent.
const SECURITY_HEADERS: &[&str] = &[
    "strict-transport-security",
    "content-security-policy",
    "x-frame-options",
    "x-content-type-options",
    "referrer-policy",
    "permissions-policy",
    "x-xss-protection",
];

/// HTTP response header collection for the target application.
#[derive(Default)]
pub struct HeadersModule;

#[async_trait]
impl ReconModule for HeadersModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Collect HTTP response headers from the target application."
    }

    async fn run(&self, ctx: &RequestContext) -> ModuleResult {
        let url = match (&ctx.url, &ctx.domain) {
            (Some(url), _) => url.clone(),
            (None, Some(domain)) => format!("https://{domain}"),
            (None, None) => {
                return ModuleResult::no_data(NAME, "a URL or domain is required for header sniffing")
            }
        };

        let user_agent = ctx.user_agent();
        let mut response = match ctx
            .client
            .head(&url)
            .header(USER_AGENT, &user_agent)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return transport_failure(NAME, "HEAD request", &err),
        };

        let mut method_used = "HEAD";
        let mut notes: Vec<String> = Vec::new();

        // Some origins reject HEAD outright; retry once with a safe GET.
        if matches!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
        ) {
            response = match ctx
                .client
                .get(&url)
                .header(USER_AGENT, &user_agent)
                .send()
                .await
            {
                Ok(response) => response,
                Err(err) => return transport_failure(NAME, "GET fallback", &err),
            };
            method_used = "GET (fallback)";
            notes.push("HEAD not supported; performed safe GET fallback".to_string());
        }

        let security_headers = collect_security_headers(response.headers());
        if security_headers.is_empty() {
            notes.push("no common security headers detected".to_string());
        }

        ModuleResult::success(NAME, describe_response(&response, method_used, security_headers, notes))
    }
}

fn collect_security_headers(headers: &HeaderMap) -> Map<String, Value> {
    let mut found = Map::new();
    for name in SECURITY_HEADERS {
        if let Some(value) = headers.get(*name).and_then(|v| v.to_str().ok()) {
            found.insert(name.to_string(), Value::String(value.to_string()));
        }
    }
    found
}

fn describe_response(
    response: &Response,
    method_used: &str,
    security_headers: Map<String, Value>,
    notes: Vec<String>,
) -> Value {
    let header_str = |name: &str| -> Value {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null)
    };

    let mut cookies = Map::new();
    for value in response.headers().get_all(SET_COOKIE) {
        if let Ok(raw) = value.to_str() {
            let pair = raw.split(';').next().unwrap_or_default();
            if let Some((name, value)) = pair.split_once('=') {
                cookies.insert(name.trim().to_string(), Value::String(value.to_string()));
            }
        }
    }

    json!({
        "url": response.url().to_string(),
        "method": method_used,
        "status_code": response.status().as_u16(),
        "server": header_str("server"),
        "powered_by": header_str("x-powered-by"),
        "cookies": cookies,
        "security_headers": security_headers,
        "notes": notes,
    })
}
