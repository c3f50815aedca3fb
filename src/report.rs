//! Rendering of check results.
//!
//! - **text**: one summary line per file followed by its diagnostics
//! - **json**: pretty-printed objects with a device summary and diagnostics
//! - **csv**: one row per diagnostic under a single header

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ReportError;
use crate::parchmint::{Checked, Diagnostic};

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// Comma-separated values.
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!(
                "Invalid output format '{s}'. Must be one of: text, json, csv"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Serialize)]
struct FileReport<'a> {
    file: String,
    valid: bool,
    device: DeviceSummary<'a>,
    errors: usize,
    warnings: usize,
    diagnostics: &'a [Diagnostic],
}

#[derive(Serialize)]
struct DeviceSummary<'a> {
    name: Option<&'a str>,
    layers: usize,
    components: usize,
    connections: usize,
}

impl<'a> FileReport<'a> {
    fn new(path: &Path, checked: &'a Checked) -> Self {
        Self {
            file: path.display().to_string(),
            valid: checked.valid,
            device: DeviceSummary {
                name: checked.device.name.as_deref(),
                layers: checked.device.layers.len(),
                components: checked.device.component_count(),
                connections: checked.device.connection_count(),
            },
            errors: checked.error_count(),
            warnings: checked.warning_count(),
            diagnostics: &checked.diagnostics,
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    file: &'a str,
    severity: String,
    code: &'static str,
    context: &'a str,
    message: &'a str,
}

/// Renders the result of checking one file.
///
/// # Errors
///
/// Returns an error if JSON or CSV serialisation fails.
pub fn render(checked: &Checked, path: &Path, format: OutputFormat) -> Result<String, ReportError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&FileReport::new(path, checked))?),
        OutputFormat::Text | OutputFormat::Csv => render_all(&[(path, checked)], format),
    }
}

/// Renders the results of several files as one report.
///
/// JSON output is an array with one object per file; CSV output has a
/// single header row.
///
/// # Errors
///
/// Returns an error if JSON or CSV serialisation fails.
pub fn render_all(entries: &[(&Path, &Checked)], format: OutputFormat) -> Result<String, ReportError> {
    match format {
        OutputFormat::Text => Ok(entries
            .iter()
            .map(|(path, checked)| render_text(path, checked))
            .collect()),
        OutputFormat::Json => {
            let reports: Vec<_> = entries
                .iter()
                .map(|(path, checked)| FileReport::new(path, checked))
                .collect();
            Ok(serde_json::to_string_pretty(&reports)?)
        }
        OutputFormat::Csv => render_csv(entries),
    }
}

fn render_text(path: &Path, checked: &Checked) -> String {
    let errors = checked.error_count();
    let warnings = checked.warning_count();
    let mut out = format!(
        "{}: {} ({} {}, {} {})\n",
        path.display(),
        if checked.valid { "VALID" } else { "INVALID" },
        errors,
        plural(errors, "error"),
        warnings,
        plural(warnings, "warning"),
    );
    for diagnostic in &checked.diagnostics {
        out.push_str("  ");
        out.push_str(&diagnostic.to_string());
        out.push('\n');
    }
    out
}

fn render_csv(entries: &[(&Path, &Checked)]) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (path, checked) in entries {
        let file = path.display().to_string();
        for diagnostic in &checked.diagnostics {
            writer.serialize(CsvRow {
                file: &file,
                severity: diagnostic.severity.to_string(),
                code: diagnostic.kind.code(),
                context: &diagnostic.context,
                message: &diagnostic.message,
            })?;
        }
    }
    writer.flush()?;
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parchmint::check_str;

    fn checked() -> Checked {
        check_str(
            r#"{
                "name": "chip",
                "layers": [ { "id": "flow", "name": "flow" } ],
                "components": [
                    { "id": "c1", "name": "a", "layers": ["flow"], "entity": "PORT",
                      "x-span": 10, "y-span": 10,
                      "ports": [ { "label": "1", "layer": "flow", "x": 0, "y": 5 } ] },
                    { "id": "c1", "name": "b", "layers": ["flow"], "entity": "PORT",
                      "x-span": 10, "y-span": 10, "ports": [] }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn text_report() {
        let out = render(&checked(), Path::new("chip.json"), OutputFormat::Text).unwrap();
        assert!(out.starts_with("chip.json: INVALID (1 error, 0 warnings)\n"));
        assert!(out.contains("error[duplicate-id]"));
    }

    #[test]
    fn json_report() {
        let out = render(&checked(), Path::new("chip.json"), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["device"]["name"], "chip");
        assert_eq!(value["device"]["components"], 1);
        assert_eq!(value["diagnostics"][0]["kind"], "duplicate-id");
    }

    #[test]
    fn csv_report_has_one_header() {
        let c = checked();
        let entries = [(Path::new("a.json"), &c), (Path::new("b.json"), &c)];
        let out = render_all(&entries, OutputFormat::Csv).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "file,severity,code,context,message");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("a.json,error,duplicate-id,"));
    }
}
