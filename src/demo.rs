use serde_json::json;

use crate::result::{ModuleResult, Report, TargetInfo};

pub const DEMO_DOMAIN: &str = "demo.shadowtrace.io";
pub const DEMO_IP: &str = "203.0.113.42";

/// Canned results for offline demos. Deterministic apart from the report
/// timestamp; no network activity whatsoever.
pub fn demo_report(selected: &[&str]) -> Report {
    let target = TargetInfo {
        domain: Some(DEMO_DOMAIN.to_string()),
        ip: Some(DEMO_IP.to_string()),
        url: Some(format!("https://{DEMO_DOMAIN}")),
    };

    let results = canned_results()
        .into_iter()
        .filter(|result| selected.contains(&result.module_name.as_str()))
        .collect();
    Report::new(target, results)
}

fn canned_results() -> Vec<ModuleResult> {
    vec![
        ModuleResult::success(
            "whois",
            json!({
                "domain": DEMO_DOMAIN,
                "status": ["clientTransferProhibited", "clientUpdateProhibited"],
                "registrar": "Example Registrar LLC",
                "events": {
                    "registration": "2023-10-02T12:15:00Z",
                    "expiration": "2026-10-02T12:15:00Z",
                },
                "nameservers": ["ns1.demo-trace.net", "ns2.demo-trace.net"],
            }),
        )
        .with_duration(std::time::Duration::from_millis(142)),
        ModuleResult::success(
            "dns",
            json!({
                "A": [DEMO_IP],
                "MX": ["10 mail.demo-trace.net."],
                "TXT": ["\"v=spf1 include:_spf.demo-trace.net -all\""],
            }),
        )
        .with_duration(std::time::Duration::from_millis(96)),
        ModuleResult::success(
            "certs",
            json!({
                "distinct_names": [DEMO_DOMAIN, format!("www.{DEMO_DOMAIN}")],
                "certificates": [
                    {
                        "common_name": DEMO_DOMAIN,
                        "name_value": format!("{DEMO_DOMAIN}\nwww.{DEMO_DOMAIN}"),
                        "issuer_name": "C=US, O=Let's Encrypt, CN=R11",
                        "not_before": "2025-06-01T00:00:00",
                        "not_after": "2025-08-30T23:59:59",
                    }
                ],
            }),
        )
        .with_duration(std::time::Duration::from_millis(210)),
        ModuleResult::success(
            "headers",
            json!({
                "url": format!("https://{DEMO_DOMAIN}/"),
                "method": "HEAD",
                "status_code": 200,
                "server": "nginx/1.25.2",
                "powered_by": null,
                "cookies": {"session": "demo"},
                "security_headers": {
                    "strict-transport-security": "max-age=63072000; includeSubDomains",
                    "content-security-policy": "default-src 'self'",
                    "x-content-type-options": "nosniff",
                },
                "notes": [],
            }),
        )
        .with_duration(std::time::Duration::from_millis(77)),
        ModuleResult::success(
            "ipinfo",
            json!({
                "ip": DEMO_IP,
                "hostname": "edge.demo-trace.net",
                "city": "Amsterdam",
                "region": "North Holland",
                "country": "NL",
                "loc": "52.3740,4.8897",
                "org": "AS64496 Example Networks BV",
                "asn": null,
                "bogon": null,
            }),
        )
        .with_duration(std::time::Duration::from_millis(63)),
        ModuleResult::no_data("social", "no social mentions discovered")
            .with_duration(std::time::Duration::from_millis(188)),
    ]
}
