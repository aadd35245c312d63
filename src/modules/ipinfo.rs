use async_trait::async_trait;
use serde_json::{json, Value};

use super::{transport_failure, ReconModule};
use crate::context::RequestContext;
use crate::result::ModuleResult;

const NAME: &str = "ipinfo";
const DEFAULT_ENDPOINT: &str = "https://ipinfo.io";

/// Passive IP intelligence: ASN, organization, and geolocation.
///
/// Relies on the engine having populated `ctx.ip`, either from `--ip` or
/// from a one-shot DNS resolution of the target domain.
pub struct IpInfoModule {
    endpoint: String,
}

impl Default for IpInfoModule {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl IpInfoModule {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ReconModule for IpInfoModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Passive IP intelligence using ipinfo.io."
    }

    async fn run(&self, ctx: &RequestContext) -> ModuleResult {
        let Some(ip) = ctx.ip.as_deref() else {
            return ModuleResult::no_data(NAME, "an IP address or resolvable domain is required");
        };

        let url = format!("{}/{}/json", self.endpoint, ip);
        let response = match ctx
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, ctx.user_agent())
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return transport_failure(NAME, "ipinfo lookup", &err),
        };

        let status = response.status();
        if !status.is_success() {
            return ModuleResult::blocked(NAME, format!("ipinfo lookup rejected: HTTP {status}"));
        }

        let payload: Value = match response.json().await {
            Ok(payload) => payload,
            Err(_) => return ModuleResult::blocked(NAME, "unexpected ipinfo response shape"),
        };

        let field = |key: &str| payload.get(key).cloned().unwrap_or(Value::Null);
        ModuleResult::success(
            NAME,
            json!({
                "ip": payload.get("ip").and_then(Value::as_str).unwrap_or(ip),
                "hostname": field("hostname"),
                "city": field("city"),
                "region": field("region"),
                "country": field("country"),
                "loc": field("loc"),
                "org": field("org"),
                "asn": field("asn"),
                "bogon": field("bogon"),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ModuleStatus;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context(ip: Option<&str>) -> RequestContext {
        RequestContext::new(
            None,
            ip.map(str::to_string),
            None,
            Duration::from_secs(2),
            reqwest::Client::builder()
                .timeout(Duration::from_secs(2))
                .build()
                .unwrap(),
        )
        .with_user_agent_provider(|| "test-agent/1.0".to_string())
    }

    #[tokio::test]
    async fn missing_ip_yields_no_data() {
        let module = IpInfoModule::default();
        let result = module.run(&context(None)).await;
        assert_eq!(result.status, ModuleStatus::NoData);
        assert!(result.error_detail.unwrap().contains("IP address"));
    }

    #[tokio::test]
    async fn extracts_asn_org_and_geo() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/198.51.100.7/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ip": "198.51.100.7",
                "city": "Amsterdam",
                "region": "North Holland",
                "country": "NL",
                "org": "AS64496 Example Networks BV",
            })))
            .mount(&server)
            .await;

        let module = IpInfoModule::with_endpoint(server.uri());
        let result = module.run(&context(Some("198.51.100.7"))).await;

        assert_eq!(result.status, ModuleStatus::Success);
        assert_eq!(result.data["org"], json!("AS64496 Example Networks BV"));
        assert_eq!(result.data["country"], json!("NL"));
        assert_eq!(result.data["hostname"], json!(null));
    }

    #[tokio::test]
    async fn rate_limit_yields_blocked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/198.51.100.7/json"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let module = IpInfoModule::with_endpoint(server.uri());
        let result = module.run(&context(Some("198.51.100.7"))).await;
        assert_eq!(result.status, ModuleStatus::Blocked);
    }
}
