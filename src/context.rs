use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::Client;

/// Outbound user-agent pool shared by every module. Rotation is a courtesy
/// to the queried services, not a correctness concern.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_2) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/121.0",
    "curl/8.5.0",
];

pub const FALLBACK_USER_AGENT: &str = "ShadowTrace/0.1";

/// Draw a user-agent from the pool with per-call randomness.
pub fn random_user_agent() -> String {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .map(|ua| ua.to_string())
        .unwrap_or_else(|| FALLBACK_USER_AGENT.to_string())
}

type UserAgentProvider = Arc<dyn Fn() -> String + Send + Sync>;

/// Immutable per-run configuration shared read-only with every module.
///
/// Built once by the engine before dispatch; no module may mutate it, so no
/// synchronization is needed during fan-out.
#[derive(Clone)]
pub struct RequestContext {
    pub domain: Option<String>,
    pub ip: Option<String>,
    pub url: Option<String>,
    pub timeout: Duration,
    pub client: Client,
    user_agent: UserAgentProvider,
}

impl RequestContext {
    pub fn new(
        domain: Option<String>,
        ip: Option<String>,
        url: Option<String>,
        timeout: Duration,
        client: Client,
    ) -> Self {
        Self {
            domain,
            ip,
            url,
            timeout,
            client,
            user_agent: Arc::new(random_user_agent),
        }
    }

    /// Replace the user-agent provider, so tests can assert on a
    /// deterministic value.
    pub fn with_user_agent_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.user_agent = Arc::new(provider);
        self
    }

    /// A user-agent string for the next outbound request.
    pub fn user_agent(&self) -> String {
        (self.user_agent)()
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("domain", &self.domain)
            .field("ip", &self.ip)
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
