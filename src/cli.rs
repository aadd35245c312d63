use clap::Parser;
use colored::*;
use std::path::PathBuf;

use serde_json::Value;

use crate::result::{ModuleResult, ModuleStatus, Report};
use crate::{run, Args, BoxError, ModuleRegistry};

// ============================================================================
// TERMINAL DESIGN
// ============================================================================

const SHADOWTRACE_LOGO: &str = r#"
   _____ __              __               ______
  / ___// /_  ____ _____/ /___ _      __ /_  __/________ _________
  \__ \/ __ \/ __ `/ __  / __ \ | /| / /  / / / ___/ __ `/ ___/ _ \
 ___/ / / / / /_/ / /_/ / /_/ / |/ |/ /  / / / /  / /_/ / /__/  __/
/____/_/ /_/\__,_/\__,_/\____/|__/|__/  /_/ /_/   \__,_/\___/\___/
"#;

const TAGLINE: &str = "Passive Reconnaissance & OSINT Aggregation Framework";
const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// CLI STRUCTURE
// ============================================================================

#[derive(Parser)]
#[command(name = "shadowtrace")]
#[command(version = VERSION)]
#[command(about = "Passive reconnaissance over public intelligence sources", long_about = None)]
struct Cli {
    /// Target domain for reconnaissance
    #[arg(short, long)]
    domain: Option<String>,

    /// Target IP address (auto-resolved from --domain when omitted)
    #[arg(long)]
    ip: Option<String>,

    /// Full URL for HTTP header collection (defaults to https://<domain>)
    #[arg(long)]
    url: Option<String>,

    /// Comma-separated list of modules to run (default: all)
    #[arg(short, long)]
    modules: Option<String>,

    /// Write Markdown report to the specified file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write JSON report to the specified file
    #[arg(long)]
    json_output: Option<PathBuf>,

    /// Per-module network timeout in seconds
    #[arg(short = 't', long, default_value_t = 10)]
    timeout: u64,

    /// List available modules and exit
    #[arg(long)]
    list_modules: bool,

    /// Suppress banner and inline module output
    #[arg(short, long)]
    quiet: bool,

    /// Generate canned output without performing network requests
    #[arg(long)]
    demo: bool,
}

// ============================================================================
// TERMINAL UI
// ============================================================================

struct TerminalUI;

impl TerminalUI {
    fn show_intro() {
        println!("{}", SHADOWTRACE_LOGO.bright_cyan().bold());
        println!("{}", "═".repeat(70).bright_black());
        println!("{:^70}", TAGLINE.bright_white().bold());
        println!("{:^70}", format!("v{VERSION}").bright_black());
        println!("{}", "═".repeat(70).bright_black());
        println!();
    }

    fn print_success(message: &str) {
        println!("  {} {}", "✓".bright_green().bold(), message.bright_white());
    }

    fn print_error(message: &str) {
        eprintln!("  {} {}", "✗".bright_red().bold(), message.bright_red());
    }

    fn print_info(message: &str) {
        println!("  {} {}", "ℹ".bright_blue(), message);
    }

    fn status_badge(status: ModuleStatus) -> ColoredString {
        match status {
            ModuleStatus::Success => "success".bright_green().bold(),
            ModuleStatus::Blocked => "blocked".bright_red().bold(),
            ModuleStatus::Timeout => "timeout".bright_yellow().bold(),
            ModuleStatus::NoData => "no_data".bright_black().bold(),
        }
    }

    /// One terminal section per module result.
    fn print_module(result: &ModuleResult) {
        println!();
        println!(
            "{} {} {}",
            format!("┌─ {}", result.module_name.to_uppercase())
                .bright_white()
                .bold(),
            Self::status_badge(result.status),
            format!("({} ms)", result.duration_ms).bright_black()
        );

        match result.status {
            ModuleStatus::Success => Self::print_data(&result.data),
            _ => {
                if let Some(detail) = &result.error_detail {
                    println!("{}  {}", "│".bright_black(), detail);
                }
            }
        }
        println!("{}", "└─".bright_black());
    }

    fn print_data(data: &Value) {
        match data {
            Value::Object(map) => {
                for (key, value) in map {
                    println!(
                        "{}  {}: {}",
                        "│".bright_black(),
                        key.bright_cyan(),
                        render_inline(value)
                    );
                }
            }
            Value::Array(items) => {
                for item in items {
                    println!("{}  - {}", "│".bright_black(), render_inline(item));
                }
            }
            other => println!("{}  {}", "│".bright_black(), render_inline(other)),
        }
    }

    fn print_summary(report: &Report) {
        println!();
        println!("{}", "RUN SUMMARY".bright_white().bold());
        println!("{}", "─".repeat(50).bright_black());
        println!(
            "  {} modules: {} success, {} blocked, {} timeout, {} no_data",
            report.summary.total,
            report.summary.success.to_string().bright_green(),
            report.summary.blocked.to_string().bright_red(),
            report.summary.timeout.to_string().bright_yellow(),
            report.summary.no_data.to_string().bright_black(),
        );
        println!("{}", "─".repeat(50).bright_black());
    }
}

fn render_inline(value: &Value) -> String {
    match value {
        Value::Null => "n/a".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_inline)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {}", render_inline(v)))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

// ============================================================================
// CLI EXECUTION
// ============================================================================

pub struct ShadowTraceCLI;

impl ShadowTraceCLI {
    pub async fn run() -> Result<(), BoxError> {
        let cli = Cli::parse();

        if cli.list_modules {
            for (name, description) in ModuleRegistry::default().describe() {
                println!("{}: {}", name.bright_cyan().bold(), description);
            }
            return Ok(());
        }

        if !cli.quiet {
            TerminalUI::show_intro();
            if cli.demo {
                TerminalUI::print_info("Demo mode: using built-in sample data, no network requests");
            }
        }

        let args = Args {
            domain: cli.domain,
            ip: cli.ip,
            url: cli.url,
            modules: cli.modules,
            output: cli.output.clone(),
            json_output: cli.json_output.clone(),
            timeout: cli.timeout,
            quiet: cli.quiet,
            demo: cli.demo,
        };

        let report = match run(args).await {
            Ok(report) => report,
            Err(err) => {
                TerminalUI::print_error(&format!("{err}"));
                return Err(err.into());
            }
        };

        if !cli.quiet {
            for result in &report.modules {
                TerminalUI::print_module(result);
            }
            TerminalUI::print_summary(&report);
            if let Some(path) = &cli.output {
                TerminalUI::print_success(&format!("Markdown report written to {}", path.display()));
            }
            if let Some(path) = &cli.json_output {
                TerminalUI::print_success(&format!("JSON report written to {}", path.display()));
            }
        }

        Ok(())
    }
}
