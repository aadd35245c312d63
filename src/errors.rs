use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures that abort the process with a non-zero exit.
///
/// Module-local network and parse failures never surface here; they are
/// folded into a `ModuleStatus` at each module's boundary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("unknown module: {0}")]
    UnknownModule(String),

    #[error("at least one of --domain, --ip, or --url must be provided")]
    MissingTarget,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
