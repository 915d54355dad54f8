//! CLI Output Formatting.
//!
//! Renders reports, threshold tables and check listings as text or JSON.
//! Rendering returns strings so the binaries decide where they go.

use console::style;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::checks::{CheckKind, CheckOutcome, Verdict};
use crate::config::ThresholdDefaults;
use crate::error::{Error, Result};
use crate::report::{HealthReport, Report};

/// Column width of the status field in text reports
const STATUS_WIDTH: usize = 7;

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT FORMAT
// ═══════════════════════════════════════════════════════════════════════════════

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Compact JSON
    Json,
    /// Indented JSON
    JsonPretty,
}

impl OutputFormat {
    /// Format name
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::JsonPretty => "json-pretty",
        }
    }

    /// Whether the format is JSON
    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::JsonPretty)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "json-pretty" | "jsonpretty" | "pretty" => Ok(OutputFormat::JsonPretty),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT FORMATTER
// ═══════════════════════════════════════════════════════════════════════════════

/// Output formatter for CLI
#[derive(Debug, Clone, Default)]
pub struct OutputFormatter {
    format: OutputFormat,
    color: bool,
}

impl OutputFormatter {
    /// Create new formatter
    pub fn new(format: OutputFormat) -> Self {
        Self { format, color: true }
    }

    /// Enable or disable color
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Get format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render an evaluation report
    pub fn render_report(&self, report: &Report) -> Result<String> {
        match (self.format, report) {
            (OutputFormat::Json, _) => report.to_json(),
            (OutputFormat::JsonPretty, _) => report.to_json_pretty(),
            (OutputFormat::Text, Report::Passthrough(facts)) => {
                let facts = serde_json::to_string_pretty(facts).map_err(|e| Error::Serialization(e.to_string()))?;
                Ok(format!("No checks requested, facts returned unchanged:\n{}", facts))
            }
            (OutputFormat::Text, Report::Evaluated(report)) => Ok(self.report_text(report)),
        }
    }

    /// Render a default-threshold table
    pub fn render_defaults(&self, defaults: &ThresholdDefaults) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string(defaults).map_err(|e| Error::Serialization(e.to_string())),
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(defaults).map_err(|e| Error::Serialization(e.to_string()))
            }
            OutputFormat::Text => {
                if defaults.is_empty() {
                    return Ok("No default thresholds configured".into());
                }
                let width = defaults.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
                let lines: Vec<String> = defaults
                    .iter()
                    .map(|(key, value)| {
                        format!("{}  {}", self.bold(&format!("{:width$}", key, width = width)), value)
                    })
                    .collect();
                Ok(lines.join("\n"))
            }
        }
    }

    /// Render the recognized check names
    pub fn render_checks(&self) -> Result<String> {
        let names: Vec<&str> = CheckKind::all().iter().map(CheckKind::name).collect();
        match self.format {
            OutputFormat::Json => serde_json::to_string(&names).map_err(|e| Error::Serialization(e.to_string())),
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(&names).map_err(|e| Error::Serialization(e.to_string()))
            }
            OutputFormat::Text => Ok(CheckKind::all()
                .iter()
                .map(|kind| {
                    let family = kind.family();
                    if kind.is_summary() {
                        format!("{} ({}, summary)", kind.name(), family)
                    } else {
                        format!("{} ({})", kind.name(), family)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Render an error line
    pub fn render_error(&self, message: &str) -> String {
        if self.format.is_json() {
            serde_json::json!({"status": "error", "message": message}).to_string()
        } else if self.color {
            format!("{} {}", style("✗").red(), message)
        } else {
            format!("ERROR: {}", message)
        }
    }

    /// Print an error line to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.render_error(message));
    }

    fn report_text(&self, report: &HealthReport) -> String {
        let width = report.checks.keys().map(String::len).max().unwrap_or(0);
        let mut lines = vec![format!("{} {}", self.bold("Overall:"), self.verdict(report.result, 0))];

        for (name, outcome) in &report.checks {
            let (status, values, ignored) = match outcome {
                CheckOutcome::Check(result) => (
                    self.verdict(result.verdict, STATUS_WIDTH),
                    &result.values,
                    !result.contributes,
                ),
                CheckOutcome::Summary(summary) => (
                    self.dim(&format!("{:w$}", "-", w = STATUS_WIDTH)),
                    &summary.values,
                    false,
                ),
            };
            let mut line = format!("  {:width$}  {}  {}", name, status, inline(values), width = width);
            if ignored {
                line.push_str(&format!(" {}", self.dim("(ignored)")));
            }
            lines.push(line.trim_end().to_string());
        }

        if report.details.is_some() {
            lines.push(format!("  {}", self.dim("(raw facts attached under 'details')")));
        }

        lines.join("\n")
    }

    // Pads before styling so escape codes do not count toward the width
    fn verdict(&self, verdict: Verdict, width: usize) -> String {
        let text = format!("{:width$}", verdict.as_str(), width = width);
        if !self.color {
            return text;
        }
        match verdict {
            Verdict::Pass => style(text).green().bold().to_string(),
            Verdict::Warning => style(text).yellow().bold().to_string(),
            Verdict::Fail => style(text).red().bold().to_string(),
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            style(text).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            style(text).dim().to_string()
        } else {
            text.to_string()
        }
    }
}

/// `key=value` pairs on one line, nested values as compact JSON
fn inline(values: &std::collections::BTreeMap<String, Value>) -> String {
    values
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{}={}", key, s),
            other => format!("{}={}", key, other),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
