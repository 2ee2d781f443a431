use std::fmt::Write as _;

use anyhow::Result;
use serde_json::Value;

use super::LayerFailure;
use super::manual::schema_count;

/// Describe the raw structure of a document that no other layer could
/// convert. Prior layer failures are listed so the cause stays visible.
pub fn summarize(spec: &Value, failures: &[LayerFailure]) -> Result<String> {
    let mut out = String::from("# OpenAPI Document Summary\n\n");
    out.push_str(
        "> The document could not be converted to full Markdown. \
         What follows is a structural summary of the raw JSON.\n\n",
    );

    match spec {
        Value::Object(root) => {
            if let Some(title) = spec.pointer("/info/title").and_then(Value::as_str) {
                writeln!(out, "**Title**: {title}\n")?;
            }
            if let Some(version) = spec.pointer("/info/version").and_then(Value::as_str) {
                writeln!(out, "**Version**: {version}\n")?;
            }
            if let Some(paths) = root.get("paths").and_then(Value::as_object) {
                writeln!(out, "**Paths**: {}\n", paths.len())?;
            }
            if let Some(count) = schema_count(spec) {
                writeln!(out, "**Schemas**: {count}\n")?;
            }

            out.push_str("**Top-level keys**:\n\n");
            if root.is_empty() {
                out.push_str("- (none)\n");
            }
            for (key, value) in root {
                writeln!(out, "- `{key}`: {}", describe(value))?;
            }
            out.push('\n');
        }
        other => {
            writeln!(
                out,
                "**Invalid structure**: expected a JSON object at the document root, found {}.\n",
                describe(other)
            )?;
        }
    }

    if !failures.is_empty() {
        out.push_str("**Conversion errors**:\n\n");
        for failure in failures {
            writeln!(out, "- {}: {}", failure.layer, failure.message)?;
        }
        out.push('\n');
    }

    Ok(out)
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(s) => format!("string ({} chars)", s.chars().count()),
        Value::Array(items) => format!("array ({} items)", items.len()),
        Value::Object(map) => format!("object ({} properties)", map.len()),
    }
}
