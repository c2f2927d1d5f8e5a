//! Output formatting for match results and compiled specifications.

use clide_core::{MatchResult, Specification, help};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Text,
}

/// Formats a match result in the requested output format.
pub fn format_result(result: &MatchResult, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(result).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Text => Ok(result_to_text(result)),
    }
}

/// Formats a compiled specification in the requested output format.
///
/// The text form is the rendered usage block.
pub fn format_spec(spec: &Specification, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(spec)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(spec).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Text => Ok(help::render(spec)),
    }
}

fn result_to_text(result: &MatchResult) -> String {
    let mut out = format!("command: {}\n", result.command());

    for (key, values) in result.options() {
        out.push_str(&format!("{key} = [{}]\n", values.join(", ")));
    }
    for (name, value) in result.positionals() {
        out.push_str(&format!("{name} = {value}\n"));
    }

    if !result.leftovers().is_empty() {
        out.push_str("--- leftovers ---\n");
        for arg in result.leftovers() {
            out.push_str(arg);
            out.push('\n');
        }
    }

    out
}
