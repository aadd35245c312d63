use async_trait::async_trait;

use crate::context::RequestContext;
use crate::result::ModuleResult;

pub mod certs;
pub mod dns;
pub mod headers;
pub mod ipinfo;
pub mod social;
pub mod whois;

pub use certs::CertsModule;
pub use dns::DnsModule;
pub use headers::HeadersModule;
pub use ipinfo::IpInfoModule;
pub use social::SocialModule;
pub use whois::WhoisModule;

/// Contract every collector implements.
///
/// `run` must never raise across this boundary: all network and parse
/// failures are caught inside the module and translated into a
/// `ModuleStatus`. A missing required context field yields `no_data` with an
/// explanatory detail rather than aborting the run.
#[async_trait]
pub trait ReconModule: Send + Sync {
    /// Registry key and report heading.
    fn name(&self) -> &'static str;

    /// One-line description shown by `--list-modules`.
    fn description(&self) -> &'static str;

    async fn run(&self, ctx: &RequestContext) -> ModuleResult;
}

/// Classify a failed outbound call: elapsed timeouts map to `timeout`,
/// everything else (connect errors, HTTP errors surfaced by reqwest) maps
/// to `blocked`.
pub(crate) fn transport_failure(
    module_name: &'static str,
    action: &str,
    err: &reqwest::Error,
) -> ModuleResult {
    if err.is_timeout() {
        ModuleResult::timeout(module_name, format!("{action} timed out"))
    } else {
        ModuleResult::blocked(module_name, format!("{action} failed: {err}"))
    }
}
