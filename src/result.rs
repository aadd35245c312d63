use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Terminal outcome of a single module invocation. Exactly one status
/// holds per result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    /// The source answered and yielded at least one relevant fact.
    Success,
    /// The source refused the request: HTTP 4xx/5xx, a malformed response,
    /// or a connection-level error other than timeout.
    Blocked,
    /// The outbound call exceeded the configured timeout.
    Timeout,
    /// The call completed cleanly but the source had nothing relevant.
    NoData,
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModuleStatus::Success => "success",
            ModuleStatus::Blocked => "blocked",
            ModuleStatus::Timeout => "timeout",
            ModuleStatus::NoData => "no_data",
        })
    }
}

/// Normalized outcome of one module run.
///
/// `data` is non-empty iff `status == Success`; `error_detail` explains any
/// non-success status and is absent on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleResult {
    #[serde(rename = "name")]
    pub module_name: String,
    pub status: ModuleStatus,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    /// Elapsed wall time in milliseconds, serialized as `duration`.
    #[serde(rename = "duration", default)]
    pub duration_ms: u64,
}

impl ModuleResult {
    pub fn success(module_name: &str, data: Value) -> Self {
        Self {
            module_name: module_name.to_string(),
            status: ModuleStatus::Success,
            data,
            error_detail: None,
            duration_ms: 0,
        }
    }

    pub fn blocked(module_name: &str, detail: impl Into<String>) -> Self {
        Self::empty(module_name, ModuleStatus::Blocked, Some(detail.into()))
    }

    pub fn timeout(module_name: &str, detail: impl Into<String>) -> Self {
        Self::empty(module_name, ModuleStatus::Timeout, Some(detail.into()))
    }

    pub fn no_data(module_name: &str, detail: impl Into<String>) -> Self {
        Self::empty(module_name, ModuleStatus::NoData, Some(detail.into()))
    }

    fn empty(module_name: &str, status: ModuleStatus, error_detail: Option<String>) -> Self {
        Self {
            module_name: module_name.to_string(),
            status,
            data: Value::Null,
            error_detail,
            duration_ms: 0,
        }
    }

    pub fn with_duration(mut self, elapsed: Duration) -> Self {
        self.duration_ms = elapsed.as_millis() as u64;
        self
    }
}

/// Target identifiers the run was launched against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl TargetInfo {
    /// Best human-readable identifier for report headings.
    pub fn label(&self) -> &str {
        self.domain
            .as_deref()
            .or(self.ip.as_deref())
            .or(self.url.as_deref())
            .unwrap_or("unknown target")
    }
}

/// Per-status tally across all executed modules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub success: usize,
    pub blocked: usize,
    pub timeout: usize,
    pub no_data: usize,
}

impl RunSummary {
    pub fn tally(results: &[ModuleResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            match result.status {
                ModuleStatus::Success => summary.success += 1,
                ModuleStatus::Blocked => summary.blocked += 1,
                ModuleStatus::Timeout => summary.timeout += 1,
                ModuleStatus::NoData => summary.no_data += 1,
            }
        }
        summary
    }
}

/// Complete outcome of one CLI invocation: run metadata plus every module
/// result in registry order. Constructed once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub target: TargetInfo,
    pub generated_at: DateTime<Utc>,
    pub summary: RunSummary,
    pub modules: Vec<ModuleResult>,
}

impl Report {
    pub fn new(target: TargetInfo, modules: Vec<ModuleResult>) -> Self {
        Self {
            target,
            generated_at: Utc::now(),
            summary: RunSummary::tally(&modules),
            modules,
        }
    }

    /// Status per module name, in report order.
    pub fn status_map(&self) -> BTreeMap<&str, ModuleStatus> {
        self.modules
            .iter()
            .map(|result| (result.module_name.as_str(), result.status))
            .collect()
    }
}
