use std::path::PathBuf;

/// Resolved invocation parameters handed to the engine.
#[derive(Clone, Debug, Default)]
pub struct Args {
    /// Target domain for reconnaissance
    pub domain: Option<String>,

    /// Target IP address; auto-resolved from the domain when absent
    pub ip: Option<String>,

    /// Full URL for HTTP header collection; defaults to https://{domain}
    pub url: Option<String>,

    /// Comma-separated module selection; None means all registered modules
    pub modules: Option<String>,

    /// Markdown report destination
    pub output: Option<PathBuf>,

    /// JSON report destination
    pub json_output: Option<PathBuf>,

    /// Per-module network timeout in seconds
    pub timeout: u64,

    /// Suppress banner and inline module output
    pub quiet: bool,

    /// Build the report from canned sample data, no network activity
    pub demo: bool,
}
