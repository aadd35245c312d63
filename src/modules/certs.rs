use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{transport_failure, ReconModule};
use crate::context::RequestContext;
use crate::result::ModuleResult;

const NAME: &str = "certs";
const DEFAULT_ENDPOINT: &str = "https://crt.sh";

/// Cap on certificate entries kept in the report.
const MAX_ENTRIES: usize = 25;

/// Certificate Transparency lookup via crt.sh.
pub struct CertsModule {
    endpoint: String,
}

impl Default for CertsModule {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl CertsModule {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ReconModule for CertsModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Certificate Transparency lookup via crt.sh."
    }

    async fn run(&self, ctx: &RequestContext) -> ModuleResult {
        let Some(domain) = ctx.domain.as_deref() else {
            return ModuleResult::no_data(NAME, "a domain is required for certificate lookups");
        };

        let response = match ctx
            .client
            .get(format!("{}/", self.endpoint))
            .query(&[("q", domain), ("output", "json")])
            .header(reqwest::header::USER_AGENT, ctx.user_agent())
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return transport_failure(NAME, "crt.sh query", &err),
        };

        let status = response.status();
        if !status.is_success() {
            return ModuleResult::blocked(NAME, format!("crt.sh query rejected: HTTP {status}"));
        }

        let entries: Vec<Value> = match response.json().await {
            Ok(entries) => entries,
            Err(_) => return ModuleResult::blocked(NAME, "unexpected crt.sh response shape"),
        };

        if entries.is_empty() {
            return ModuleResult::no_data(NAME, "crt.sh returned no certificates");
        }

        let mut seen = HashSet::new();
        let mut names = HashSet::new();
        let mut certificates = Vec::new();

        for entry in &entries {
            let common_name = entry.get("common_name").and_then(Value::as_str);
            let name_value = entry.get("name_value").and_then(Value::as_str);

            if let Some(cn) = common_name {
                names.insert(cn.to_string());
            }
            // crt.sh packs SANs into a newline-separated blob.
            for san in name_value.unwrap_or_default().lines() {
                if !san.is_empty() {
                    names.insert(san.to_string());
                }
            }

            let fingerprint = entry
                .get("sha256")
                .or_else(|| entry.get("sha1"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| {
                    format!(
                        "{}:{}",
                        common_name.unwrap_or_default(),
                        name_value.unwrap_or_default()
                    )
                });
            if !seen.insert(fingerprint) {
                continue;
            }

            certificates.push(json!({
                "common_name": common_name,
                "name_value": name_value,
                "issuer_name": entry.get("issuer_name").cloned().unwrap_or(Value::Null),
                "not_before": entry.get("not_before").cloned().unwrap_or(Value::Null),
                "not_after": entry.get("not_after").cloned().unwrap_or(Value::Null),
            }));
            if certificates.len() >= MAX_ENTRIES {
                break;
            }
        }

        let mut distinct_names: Vec<String> = names.into_iter().collect();
        distinct_names.sort();

        ModuleResult::success(
            NAME,
            json!({
                "distinct_names": distinct_names,
                "certificates": certificates,
            }),
        )
    }
}
