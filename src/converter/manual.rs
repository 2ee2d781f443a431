use std::fmt::Write as _;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use super::renderer::{embedded, group_name, operation_title, single_line};

/// Marker present in every manually built document.
pub const MANUAL_MARKER: &str = "Manually Parsed";

const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Build Markdown straight from the JSON shape of an OpenAPI or Swagger
/// document, without the standard renderer.
///
/// Fails when the root is not an object or has no `paths` object.
pub fn render(spec: &Value) -> Result<String> {
    let root = spec
        .as_object()
        .context("document root is not a JSON object")?;
    let paths = root
        .get("paths")
        .and_then(Value::as_object)
        .context("document has no `paths` object")?;
    let info = root.get("info").and_then(Value::as_object);

    let mut out = String::new();
    let title = text_field(info, "title").unwrap_or("Untitled API");
    writeln!(out, "# {}\n", single_line(title))?;
    writeln!(
        out,
        "> {MANUAL_MARKER}: the standard renderer could not process this document, \
         so it was rebuilt from its raw structure.\n"
    )?;
    if let Some(description) = text_field(info, "description") {
        writeln!(out, "{}\n", embedded(description))?;
    }
    if let Some(version) = text_field(info, "version") {
        writeln!(out, "**Version**: {version}\n")?;
    }

    let mut groups: Vec<(String, String)> = Vec::new();
    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            continue;
        };
        for (method, operation) in item {
            if !HTTP_METHODS.contains(&method.to_ascii_lowercase().as_str()) {
                continue;
            }
            let Some(operation) = operation.as_object() else {
                continue;
            };
            let method = method.to_ascii_uppercase();
            let tag = group_name(
                operation
                    .get("tags")
                    .and_then(Value::as_array)
                    .and_then(|tags| tags.first())
                    .and_then(Value::as_str)
                    .unwrap_or(""),
            );

            let mut block = String::new();
            let title = operation_title(
                text_field(Some(operation), "summary"),
                text_field(Some(operation), "operationId"),
                &method,
                path,
            );
            writeln!(block, "### {title}\n")?;
            writeln!(block, "```http\n{method} {path}\n```\n")?;
            if let Some(description) = text_field(Some(operation), "description") {
                writeln!(block, "{}\n", embedded(description))?;
            }

            match groups.iter_mut().find(|(name, _)| *name == tag) {
                Some((_, body)) => body.push_str(&block),
                None => groups.push((tag, block)),
            }
        }
    }

    for (tag, body) in &groups {
        writeln!(out, "## {tag}\n")?;
        out.push_str(body);
    }

    if let Some(count) = schema_count(spec) {
        writeln!(out, "## Schemas\n")?;
        writeln!(out, "This document defines {count} schemas.\n")?;
    }

    Ok(out)
}

/// Number of schemas under `components.schemas`, or Swagger 2.0
/// `definitions`.
pub(crate) fn schema_count(spec: &Value) -> Option<usize> {
    spec.pointer("/components/schemas")
        .or_else(|| spec.get("definitions"))
        .and_then(Value::as_object)
        .map(Map::len)
}

fn text_field<'a>(object: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a str> {
    object?
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
