use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::ReconModule;
use crate::context::RequestContext;
use crate::result::ModuleResult;

const NAME: &str = "dns";
const DEFAULT_ENDPOINT: &str = "https://dns.google/resolve";

/// Record types queried per run, with their RFC 1035 type ids.
const DNS_TYPES: &[(&str, u16)] = &[
    ("A", 1),
    ("AAAA", 28),
    ("MX", 15),
    ("NS", 2),
    ("TXT", 16),
];

/// Passive DNS record discovery via DNS-over-HTTPS.
pub struct DnsModule {
    endpoint: String,
}

impl Default for DnsModule {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl DnsModule {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ReconModule for DnsModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Passive DNS record discovery via DNS-over-HTTPS."
    }

    async fn run(&self, ctx: &RequestContext) -> ModuleResult {
        let Some(domain) = ctx.domain.as_deref() else {
            return ModuleResult::no_data(NAME, "a domain is required for DNS enumeration");
        };

        let mut records = Map::new();
        let mut failures: Vec<String> = Vec::new();
        let mut timed_out = false;

        for (record_type, type_id) in DNS_TYPES {
            match self.query_type(ctx, domain, *type_id).await {
                Ok(values) if !values.is_empty() => {
                    records.insert(record_type.to_string(), json!(values));
                }
                Ok(_) => {}
                Err(QueryFailure::Timeout) => {
                    timed_out = true;
                    failures.push(format!("{record_type} lookup timed out"));
                }
                Err(QueryFailure::Rejected(reason)) => {
                    failures.push(format!("{record_type} lookup {reason}"));
                }
            }
        }

        if !records.is_empty() {
            return ModuleResult::success(NAME, Value::Object(records));
        }
        if failures.is_empty() {
            return ModuleResult::no_data(NAME, "no records returned for any queried type");
        }
        if timed_out {
            ModuleResult::timeout(NAME, failures.join("; "))
        } else {
            ModuleResult::blocked(NAME, failures.join("; "))
        }
    }
}

enum QueryFailure {
    Timeout,
    Rejected(String),
}

impl DnsModule {
    async fn query_type(
        &self,
        ctx: &RequestContext,
        domain: &str,
        type_id: u16,
    ) -> Result<Vec<String>, QueryFailure> {
        let response = ctx
            .client
            .get(&self.endpoint)
            .query(&[("name", domain), ("type", &type_id.to_string())])
            .header(reqwest::header::USER_AGENT, ctx.user_agent())
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    QueryFailure::Timeout
                } else {
                    QueryFailure::Rejected(format!("failed: {err}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryFailure::Rejected(format!("rejected: HTTP {status}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|_| QueryFailure::Rejected("returned a malformed body".to_string()))?;

        // DoH carries the DNS RCODE in "Status". A non-zero RCODE
        // (NXDOMAIN and friends) is still a clean answer, just one with no
        // usable records for this type.
        match payload.get("Status").and_then(Value::as_u64) {
            Some(0) => {}
            Some(_) => return Ok(Vec::new()),
            None => {
                return Err(QueryFailure::Rejected(
                    "returned an unexpected payload".to_string(),
                ));
            }
        }

        let values = payload
            .get("Answer")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|answer| answer.get("data").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        Ok(values)
    }
}
