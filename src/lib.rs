pub mod args;
pub mod cli;
mod context;
mod demo;
mod engine;
mod errors;
mod modules;
mod registry;
mod reporting;
mod result;

pub use args::Args;
pub use context::RequestContext;
pub use engine::ReconEngine;
pub use errors::CliError;
pub use modules::ReconModule;
pub use registry::ModuleRegistry;
pub use reporting::{render_json, render_markdown, write_outputs};
pub use result::{ModuleResult, ModuleStatus, Report, RunSummary, TargetInfo};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Execute one reconnaissance run end to end: resolve the module
/// selection, dispatch, and write any requested report files.
///
/// Module failures are folded into the report; only argument problems,
/// client bootstrap, and output writes can error here.
pub async fn run(args: Args) -> Result<Report, CliError> {
    let registry = ModuleRegistry::default();
    let modules = match &args.modules {
        Some(selection) => registry.resolve(selection)?,
        None => registry.all(),
    };

    let report = if args.demo {
        let selected: Vec<&str> = modules.iter().map(|m| m.name()).collect();
        demo::demo_report(&selected)
    } else {
        if args.domain.is_none() && args.ip.is_none() && args.url.is_none() {
            return Err(CliError::MissingTarget);
        }
        let engine = ReconEngine::bootstrap(&args, modules).await?;
        if !args.quiet {
            engine.log_run_banner();
        }
        engine.execute().await
    };

    write_outputs(
        &report,
        args.output.as_deref(),
        args.json_output.as_deref(),
    )?;
    reporting::append_run_log(&args, &report);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_module_aborts_before_any_network_call() {
        let args = Args {
            domain: Some("example.com".to_string()),
            modules: Some("dns,shodan".to_string()),
            timeout: 5,
            ..Args::default()
        };
        let err = run(args).await.unwrap_err();
        assert!(matches!(err, CliError::UnknownModule(ref token) if token == "shodan"));
    }

    #[tokio::test]
    async fn live_run_without_target_is_an_argument_error() {
        let args = Args {
            timeout: 5,
            ..Args::default()
        };
        let err = run(args).await.unwrap_err();
        assert!(matches!(err, CliError::MissingTarget));
    }

    #[tokio::test]
    async fn demo_run_writes_reports_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let md = dir.path().join("report.md");
        let js = dir.path().join("report.json");
        std::env::set_var(
            reporting::RUN_LOG_ENV_VAR,
            dir.path().join("runs.log"),
        );

        let args = Args {
            demo: true,
            quiet: true,
            timeout: 5,
            output: Some(md.clone()),
            json_output: Some(js.clone()),
            ..Args::default()
        };
        let report = run(args).await.unwrap();

        assert_eq!(report.summary.total, 6);
        assert!(md.exists());
        let payload: Report = serde_json::from_str(&std::fs::read_to_string(&js).unwrap()).unwrap();
        assert!(payload
            .modules
            .iter()
            .any(|result| result.module_name == "whois"));
    }
}
