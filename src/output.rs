//! @ai:module:intent Format run reports and transformed sources for the terminal (JSON, text)
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_report, format_source, to_json
//! @ai:module:depends_on batch, target
//! @ai:module:stateless true

use crate::batch::BatchReport;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Format a batch report as a string
/// @ai:effects pure
pub fn format_report(report: &BatchReport, format: OutputFormat, strict: bool) -> String {
    match format {
        OutputFormat::Json => to_json(report, false),
        OutputFormat::JsonPretty => to_json(report, true),
        OutputFormat::Text => format_report_text(report, strict),
    }
}

/// @ai:intent Format a batch report as human-readable text
/// @ai:effects pure
fn format_report_text(report: &BatchReport, strict: bool) -> String {
    let mut output = String::new();

    for file in &report.files {
        if let Some(error) = &file.error {
            output.push_str(&format!(
                "{} {} - {}\n",
                "ERROR".red().bold(),
                file.path.display().to_string().dimmed(),
                error
            ));
            continue;
        }

        for removal in &file.removals {
            output.push_str(&format!(
                "{} {} {} ({}:{})\n",
                "REMOVED".green(),
                removal.kind,
                removal.name.cyan(),
                file.path.display().to_string().dimmed(),
                removal.position
            ));
        }
    }

    if strict {
        for target in &report.unmatched_targets {
            output.push_str(&format!(
                "{} {} never matched\n",
                "STRICT".yellow().bold(),
                target.to_string().cyan()
            ));
        }

        for root in &report.unchanged_roots {
            output.push_str(&format!(
                "{} nothing removed under {}\n",
                "STRICT".yellow().bold(),
                root.display()
            ));
        }
    }

    output.push('\n');
    output.push_str(&format!(
        "Processed {} files, {} changed\n",
        report.files.len(),
        report.files_changed
    ));

    if report.failures > 0 {
        output.push_str(&format!(
            "{} failed, {} annotations and {} imports removed\n",
            report.failures.to_string().red().bold(),
            report.annotations_removed,
            report.imports_removed
        ));
    } else {
        output.push_str(&format!(
            "{} {} annotations and {} imports removed\n",
            "OK".green().bold(),
            report.annotations_removed,
            report.imports_removed
        ));
    }

    output
}

/// @ai:intent Render a transformed source for stdout, headed by its path when it has one
/// @ai:effects pure
pub fn format_source(path: Option<&Path>, text: &str) -> String {
    match path {
        Some(path) => format!("{}:\n{}", path.display(), text),
        None => text.to_string(),
    }
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap_or_default()
    } else {
        serde_json::to_string(value).unwrap_or_default()
    }
}
