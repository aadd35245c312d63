use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{transport_failure, ReconModule};
use crate::context::RequestContext;
use crate::result::ModuleResult;

const NAME: &str = "whois";
const DEFAULT_ENDPOINT: &str = "https://rdap.org/domain";

/// Domain registration metadata via public RDAP.
pub struct WhoisModule {
    endpoint: String,
}

impl Default for WhoisModule {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl WhoisModule {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ReconModule for WhoisModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Domain registration details via public RDAP."
    }

    async fn run(&self, ctx: &RequestContext) -> ModuleResult {
        let Some(domain) = ctx.domain.as_deref() else {
            return ModuleResult::no_data(NAME, "a domain is required for WHOIS lookups");
        };

        let url = format!("{}/{}", self.endpoint, domain);
        let response = match ctx
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, ctx.user_agent())
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return transport_failure(NAME, "RDAP query", &err),
        };

        let status = response.status();
        if !status.is_success() {
            return ModuleResult::blocked(NAME, format!("RDAP query rejected: HTTP {status}"));
        }

        let record: Value = match response.json().await {
            Ok(record) => record,
            Err(_) => return ModuleResult::blocked(NAME, "unexpected RDAP response shape"),
        };

        let events = extract_events(&record);
        let nameservers = extract_nameservers(&record);
        if events.is_empty() && nameservers.is_empty() {
            return ModuleResult::no_data(NAME, "RDAP record carries no event or nameserver data");
        }

        ModuleResult::success(
            NAME,
            json!({
                "domain": record.get("ldhName").cloned().unwrap_or(Value::Null),
                "status": record.get("status").cloned().unwrap_or(Value::Null),
                "registrar": extract_registrar(&record),
                "events": events,
                "nameservers": nameservers,
            }),
        )
    }
}

/// Map of RDAP event action to event date, e.g. "registration" and
/// "expiration".
fn extract_events(record: &Value) -> Map<String, Value> {
    let mut mapped = Map::new();
    for event in iter_array(record, "events") {
        let action = event.get("eventAction").and_then(Value::as_str);
        let date = event.get("eventDate").and_then(Value::as_str);
        if let (Some(action), Some(date)) = (action, date) {
            mapped.insert(action.to_string(), Value::String(date.to_string()));
        }
    }
    mapped
}

fn extract_nameservers(record: &Value) -> Vec<String> {
    iter_array(record, "nameservers")
        .filter_map(|ns| {
            ns.get("ldhName")
                .or_else(|| ns.get("unicodeName"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect()
}

/// Registrar name from the entity list: prefer the vCard full name, fall
/// back to the entity handle.
fn extract_registrar(record: &Value) -> Value {
    for entity in iter_array(record, "entities") {
        let roles: Vec<&str> = entity
            .get("roles")
            .and_then(Value::as_array)
            .map(|roles| roles.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        if !roles.contains(&"registrar") && !roles.contains(&"registrant") {
            continue;
        }

        if let Some(items) = entity
            .get("vcardArray")
            .and_then(Value::as_array)
            .filter(|vcard| vcard.len() == 2)
            .and_then(|vcard| vcard[1].as_array())
        {
            for item in items {
                if let Some(fields) = item.as_array() {
                    if fields.len() >= 4 && fields[0].as_str() == Some("fn") {
                        return fields[3].clone();
                    }
                }
            }
        }

        if let Some(handle) = entity.get("handle").and_then(Value::as_str) {
            return Value::String(handle.to_string());
        }
    }
    Value::Null
}

fn iter_array<'a>(record: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    record
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}
