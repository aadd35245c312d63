use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::{json, Value};

use crate::args::Args;
use crate::errors::CliError;
use crate::result::{ModuleStatus, Report};

pub const RUN_LOG_ENV_VAR: &str = "SHADOWTRACE_RUNLOG";
const DEFAULT_RUN_LOG: &str = "shadowtrace_runs.log";

/// Render the Markdown report: one section per module, heading = module
/// name, body = formatted data or a one-line status explanation. Pure
/// function of the report; same report in, same text out.
pub fn render_markdown(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# ShadowTrace Recon Report: {}\n\n",
        report.target.label()
    ));
    out.push_str(&format!(
        "Generated: {}\n\n",
        report.generated_at.format("%Y-%m-%dT%H:%M:%SZ")
    ));

    out.push_str("| Status | Count |\n| --- | ---: |\n");
    out.push_str(&format!("| success | {} |\n", report.summary.success));
    out.push_str(&format!("| blocked | {} |\n", report.summary.blocked));
    out.push_str(&format!("| timeout | {} |\n", report.summary.timeout));
    out.push_str(&format!("| no_data | {} |\n", report.summary.no_data));
    out.push_str(&format!("| **total** | **{}** |\n\n", report.summary.total));

    for result in &report.modules {
        out.push_str(&format!("## {}\n\n", result.module_name));
        if result.status == ModuleStatus::Success {
            render_value(&result.data, 0, &mut out);
        } else {
            let detail = result
                .error_detail
                .as_deref()
                .unwrap_or("no further detail");
            out.push_str(&format!("*{}*: {}\n", result.status, detail));
        }
        out.push_str(&format!("\n_completed in {} ms_\n\n", result.duration_ms));
    }

    out
}

fn render_value(value: &Value, depth: usize, out: &mut String) {
    let pad = "  ".repeat(depth);
    match value {
        Value::Object(map) => {
            for (key, entry) in map {
                match entry {
                    Value::Object(_) | Value::Array(_) if !is_scalar_array(entry) => {
                        out.push_str(&format!("{pad}- **{key}**:\n"));
                        render_value(entry, depth + 1, out);
                    }
                    _ => {
                        out.push_str(&format!("{pad}- **{key}**: {}\n", scalar(entry)));
                    }
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(map) => {
                        let inline: Vec<String> = map
                            .iter()
                            .map(|(k, v)| format!("{k}: {}", scalar(v)))
                            .collect();
                        out.push_str(&format!("{pad}- {}\n", inline.join(", ")));
                    }
                    _ => out.push_str(&format!("{pad}- {}\n", scalar(item))),
                }
            }
        }
        _ => out.push_str(&format!("{pad}{}\n", scalar(value))),
    }
}

fn is_scalar_array(value: &Value) -> bool {
    value
        .as_array()
        .map(|items| items.iter().all(|item| !item.is_object() && !item.is_array()))
        .unwrap_or(false)
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "n/a".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

/// Serialize the full report structure, machine-readable.
pub fn render_json(report: &Report) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Write the requested report files. Output-write failures are the only
/// fatal outcome of a completed run.
pub fn write_outputs(
    report: &Report,
    markdown_path: Option<&Path>,
    json_path: Option<&Path>,
) -> Result<(), CliError> {
    if let Some(path) = markdown_path {
        write_file(path, &render_markdown(report))?;
    }
    if let Some(path) = json_path {
        write_file(path, &render_json(report))?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|source| CliError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Run log path: `SHADOWTRACE_RUNLOG` wins over the default in the working
/// directory.
pub fn run_log_path() -> PathBuf {
    env::var(RUN_LOG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_RUN_LOG))
}

/// Append one JSON line describing this run. Best effort: a failure here
/// never fails the invocation, it is only reported on stderr.
pub fn append_run_log(args: &Args, report: &Report) {
    let record = json!({
        "timestamp": Utc::now().to_rfc3339(),
        "domain": report.target.domain,
        "ip": report.target.ip,
        "url": report.target.url,
        "modules": report
            .modules
            .iter()
            .map(|r| r.module_name.clone())
            .collect::<Vec<_>>(),
        "output": args.output.as_ref().map(|p| p.display().to_string()),
        "json_output": args.json_output.as_ref().map(|p| p.display().to_string()),
        "summary": report.summary,
        "results": report.modules,
    });

    let path = run_log_path();
    let appended = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut file| writeln!(file, "{record}"));
    if let Err(err) = appended {
        if !args.quiet {
            eprintln!("[!] failed to write run log {}: {err}", path.display());
        }
    }
}
