use std::time::{Duration, Instant};

use futures::future::join_all;
use reqwest::redirect::Policy;
use reqwest::Client;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

use crate::args::Args;
use crate::context::RequestContext;
use crate::errors::CliError;
use crate::modules::ReconModule;
use crate::result::{Report, TargetInfo};

/// Orchestrates a run: owns the shared context, fans the modules out, and
/// aggregates their results into a report.
pub struct ReconEngine {
    ctx: RequestContext,
    modules: Vec<Box<dyn ReconModule>>,
}

impl ReconEngine {
    /// Build the shared HTTP client and context, resolving the target IP
    /// from the domain when `--ip` was not given. An explicit `--ip` always
    /// wins; DNS resolution is only the fallback, and its failure simply
    /// leaves the IP unset.
    pub async fn bootstrap(args: &Args, modules: Vec<Box<dyn ReconModule>>) -> Result<Self, CliError> {
        let timeout = Duration::from_secs(args.timeout);
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(2))
            .build()?;

        let ip = match (&args.ip, &args.domain) {
            (Some(ip), _) => Some(ip.clone()),
            (None, Some(domain)) => resolve_ip(domain).await,
            (None, None) => None,
        };

        let ctx = RequestContext::new(args.domain.clone(), ip, args.url.clone(), timeout, client);
        Ok(Self::new(ctx, modules))
    }

    pub fn new(ctx: RequestContext, modules: Vec<Box<dyn ReconModule>>) -> Self {
        Self { ctx, modules }
    }

    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    pub fn log_run_banner(&self) {
        eprintln!("[*] Starting passive recon run");
        eprintln!("[*] Configuration:");
        if let Some(domain) = &self.ctx.domain {
            eprintln!("    - Domain: {domain}");
        }
        if let Some(ip) = &self.ctx.ip {
            eprintln!("    - IP: {ip}");
        }
        if let Some(url) = &self.ctx.url {
            eprintln!("    - URL: {url}");
        }
        eprintln!("    - Timeout: {}s", self.ctx.timeout.as_secs());
        eprintln!(
            "    - Modules: {}",
            self.modules
                .iter()
                .map(|m| m.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    /// Run every module and aggregate the results.
    ///
    /// Modules are started together and awaited as a set; `join_all`
    /// returns results in future order, so the report always follows the
    /// selection order regardless of which module finished first. A failing
    /// module never aborts the run: failure is a `ModuleStatus`, not an
    /// error. The timeout is enforced per outbound call by the shared HTTP
    /// client, so a module making several sequential lookups may run longer
    /// than one timeout without being cut off.
    pub async fn execute(self) -> Report {
        let ctx = &self.ctx;

        let runs = self.modules.iter().map(|module| async move {
            let started = Instant::now();
            module.run(ctx).await.with_duration(started.elapsed())
        });
        let results = join_all(runs).await;

        let target = TargetInfo {
            domain: self.ctx.domain.clone(),
            ip: self.ctx.ip.clone(),
            url: self.ctx.url.clone(),
        };
        Report::new(target, results)
    }
}

/// One-shot system DNS resolution used only to seed the context IP.
async fn resolve_ip(domain: &str) -> Option<String> {
    let resolver = TokioAsyncResolver::tokio(ResolverConfig::cloudflare(), ResolverOpts::default());
    let lookup = resolver.lookup_ip(domain).await.ok()?;
    lookup.iter().next().map(|ip| ip.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{CertsModule, DnsModule, HeadersModule};
    use crate::result::{ModuleResult, ModuleStatus};
    use async_trait::async_trait;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FakeModule {
        name: &'static str,
        delay: Duration,
        status: ModuleStatus,
    }

    #[async_trait]
    impl ReconModule for FakeModule {
        fn name(&self) -> &'static str {
            self.name
        }

        fn description(&self) -> &'static str {
            "fake module for scheduling tests"
        }

        async fn run(&self, _ctx: &RequestContext) -> ModuleResult {
            tokio::time::sleep(self.delay).await;
            match self.status {
                ModuleStatus::Success => ModuleResult::success(self.name, json!({"ok": true})),
                ModuleStatus::Blocked => ModuleResult::blocked(self.name, "refused"),
                ModuleStatus::Timeout => ModuleResult::timeout(self.name, "timed out"),
                ModuleStatus::NoData => ModuleResult::no_data(self.name, "nothing"),
            }
        }
    }

    fn context(timeout: Duration) -> RequestContext {
        RequestContext::new(
            Some("example.com".to_string()),
            None,
            None,
            timeout,
            reqwest::Client::builder().timeout(timeout).build().unwrap(),
        )
        .with_user_agent_provider(|| "test-agent/1.0".to_string())
    }

    #[tokio::test]
    async fn report_order_ignores_completion_order() {
        let modules: Vec<Box<dyn ReconModule>> = vec![
            Box::new(FakeModule {
                name: "slow",
                delay: Duration::from_millis(120),
                status: ModuleStatus::Success,
            }),
            Box::new(FakeModule {
                name: "fast",
                delay: Duration::from_millis(0),
                status: ModuleStatus::Success,
            }),
            Box::new(FakeModule {
                name: "middle",
                delay: Duration::from_millis(40),
                status: ModuleStatus::NoData,
            }),
        ];

        let engine = ReconEngine::new(context(Duration::from_secs(2)), modules);
        let report = engine.execute().await;

        let order: Vec<&str> = report
            .modules
            .iter()
            .map(|r| r.module_name.as_str())
            .collect();
        assert_eq!(order, vec!["slow", "fast", "middle"]);
    }

    #[tokio::test]
    async fn summary_counts_match_results() {
        let modules: Vec<Box<dyn ReconModule>> = vec![
            Box::new(FakeModule {
                name: "a",
                delay: Duration::ZERO,
                status: ModuleStatus::Success,
            }),
            Box::new(FakeModule {
                name: "b",
                delay: Duration::ZERO,
                status: ModuleStatus::Blocked,
            }),
            Box::new(FakeModule {
                name: "c",
                delay: Duration::ZERO,
                status: ModuleStatus::NoData,
            }),
        ];

        let engine = ReconEngine::new(context(Duration::from_secs(2)), modules);
        let report = engine.execute().await;

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.success, 1);
        assert_eq!(report.summary.blocked, 1);
        assert_eq!(report.summary.no_data, 1);
        assert_eq!(report.summary.timeout, 0);
    }

    /// A module making several sequential lookups may legitimately run
    /// longer than one timeout. The engine must not cut it off, and the
    /// records it collected must survive into the report.
    #[tokio::test]
    async fn slow_sibling_lookups_do_not_discard_collected_records() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/resolve"))
            .and(query_param("type", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Status": 0,
                "Answer": [{"data": "198.51.100.7", "type": 1}]
            })))
            .mount(&server)
            .await;
        for type_id in ["28", "15", "2", "16"] {
            Mock::given(method("GET"))
                .and(path("/resolve"))
                .and(query_param("type", type_id))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"Status": 0, "Answer": []}))
                        .set_delay(Duration::from_millis(400)),
                )
                .mount(&server)
                .await;
        }

        // Each call stays under the timeout; the module as a whole does not.
        let modules: Vec<Box<dyn ReconModule>> = vec![Box::new(DnsModule::with_endpoint(
            format!("{}/resolve", server.uri()),
        ))];
        let engine = ReconEngine::new(context(Duration::from_millis(500)), modules);
        let report = engine.execute().await;

        assert_eq!(report.modules[0].status, ModuleStatus::Success);
        assert_eq!(report.modules[0].data["A"], json!(["198.51.100.7"]));
        assert!(report.modules[0].duration_ms >= 1600);
    }

    /// The end-to-end scenario: DoH answers, crt.sh is empty, and the
    /// header fetch times out. The summary must read success/no_data/timeout.
    #[tokio::test]
    async fn mixed_outcomes_tally_correctly() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/resolve"))
            .and(query_param("type", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Status": 0,
                "Answer": [
                    {"data": "198.51.100.7", "type": 1},
                    {"data": "198.51.100.8", "type": 1}
                ]
            })))
            .mount(&server)
            .await;
        for type_id in ["28", "15", "2"] {
            Mock::given(method("GET"))
                .and(path("/resolve"))
                .and(query_param("type", type_id))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"Status": 0, "Answer": []})),
                )
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/resolve"))
            .and(query_param("type", "16"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Status": 0,
                "Answer": [{"data": "\"v=spf1 -all\"", "type": 16}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        Mock::given(method("HEAD"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let timeout = Duration::from_millis(400);
        let ctx = RequestContext::new(
            Some("example.com".to_string()),
            None,
            Some(format!("{}/slow", server.uri())),
            timeout,
            reqwest::Client::builder().timeout(timeout).build().unwrap(),
        )
        .with_user_agent_provider(|| "test-agent/1.0".to_string());

        let modules: Vec<Box<dyn ReconModule>> = vec![
            Box::new(DnsModule::with_endpoint(format!("{}/resolve", server.uri()))),
            Box::new(CertsModule::with_endpoint(server.uri())),
            Box::new(HeadersModule),
        ];

        let engine = ReconEngine::new(ctx, modules);
        let report = engine.execute().await;

        let statuses = report.status_map();
        assert_eq!(statuses["dns"], ModuleStatus::Success);
        assert_eq!(statuses["certs"], ModuleStatus::NoData);
        assert_eq!(statuses["headers"], ModuleStatus::Timeout);

        assert_eq!(report.summary.success, 1);
        assert_eq!(report.summary.no_data, 1);
        assert_eq!(report.summary.timeout, 1);

        let dns = &report.modules[0];
        assert_eq!(dns.data["A"].as_array().unwrap().len(), 2);
        assert_eq!(dns.data["TXT"].as_array().unwrap().len(), 1);

        let headers = &report.modules[2];
        assert!(headers
            .error_detail
            .as_deref()
            .unwrap()
            .contains("timed out"));
    }
}
