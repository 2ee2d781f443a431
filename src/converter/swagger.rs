use std::fmt::Write as _;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use super::renderer::{
    Labels, cell, embedded, group_name, label_of, non_empty, operation_title, ref_name,
    single_line,
};

const METHODS: &[&str] = &["get", "post", "put", "patch", "delete", "head", "options"];

const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// Whether the document declares `"swagger": "2.x"`.
pub(crate) fn is_swagger(spec: &Value) -> bool {
    spec.get("swagger")
        .and_then(Value::as_str)
        .is_some_and(|version| version.trim().starts_with("2."))
}

struct Entry<'a> {
    method: String,
    path: &'a str,
    shared: &'a [Value],
    op: &'a Map<String, Value>,
}

/// Render a Swagger 2.0 document with the same layout as OpenAPI 3.0
/// output. `info.title`, `info.version`, `paths` and every operation's
/// `responses` are required.
pub(crate) fn render(spec: &Value, labels: &Labels) -> Result<String> {
    let root = spec
        .as_object()
        .context("document root is not a JSON object")?;
    let info = root
        .get("info")
        .and_then(Value::as_object)
        .context("Swagger document has no `info` object")?;
    let title = text(info, "title").context("Swagger document has no `info.title`")?;
    let version = text(info, "version").context("Swagger document has no `info.version`")?;
    let paths = root
        .get("paths")
        .and_then(Value::as_object)
        .context("Swagger document has no `paths` object")?;

    let mut out = String::new();
    writeln!(out, "# {}\n", single_line(title))?;
    if let Some(description) = text(info, "description") {
        writeln!(out, "{}\n", embedded(description))?;
    }
    writeln!(out, "**{}**: {version}\n", labels.version)?;
    if let Some(host) = text(root, "host") {
        let base_path = text(root, "basePath").unwrap_or("");
        let schemes = strings(root.get("schemes"));
        writeln!(out, "**{}**:\n", labels.servers)?;
        if schemes.is_empty() {
            writeln!(out, "- `{host}{base_path}`")?;
        }
        for scheme in schemes {
            writeln!(out, "- `{scheme}://{host}{base_path}`")?;
        }
        out.push('\n');
    }

    let tags = root.get("tags").and_then(Value::as_array);
    let mut groups: Vec<(String, Vec<Entry<'_>>)> = tags
        .into_iter()
        .flatten()
        .filter_map(|tag| tag.get("name").and_then(Value::as_str))
        .map(|name| (group_name(name), Vec::new()))
        .collect();
    for (path, item) in paths {
        let item = item
            .as_object()
            .with_context(|| format!("path item `{path}` is not an object"))?;
        let shared = item
            .get("parameters")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice);
        for method in METHODS {
            let Some(op) = item.get(*method) else {
                continue;
            };
            let method = method.to_ascii_uppercase();
            let Some(op) = op.as_object() else {
                bail!("operation `{method} {path}` is not an object");
            };
            if !op.get("responses").is_some_and(Value::is_object) {
                bail!("operation `{method} {path}` has no `responses` object");
            }
            let tag = group_name(
                op.get("tags")
                    .and_then(Value::as_array)
                    .and_then(|tags| tags.first())
                    .and_then(Value::as_str)
                    .unwrap_or(""),
            );
            let entry = Entry { method, path, shared, op };
            match groups.iter_mut().find(|(name, _)| *name == tag) {
                Some((_, entries)) => entries.push(entry),
                None => groups.push((tag, vec![entry])),
            }
        }
    }

    let consumes = strings(root.get("consumes"));
    for (tag, entries) in groups.iter().filter(|(_, entries)| !entries.is_empty()) {
        writeln!(out, "## {tag}\n")?;
        let description = tags
            .into_iter()
            .flatten()
            .find(|t| {
                t.get("name").and_then(Value::as_str).map(group_name).as_ref() == Some(tag)
            })
            .and_then(|t| non_empty(t.get("description").and_then(Value::as_str)));
        if let Some(description) = description {
            writeln!(out, "{}\n", embedded(description))?;
        }
        for entry in entries {
            render_operation(&mut out, entry, &consumes, labels)?;
        }
    }

    if let Some(definitions) = root.get("definitions").and_then(Value::as_object) {
        if !definitions.is_empty() {
            writeln!(out, "## {}\n", labels.schemas)?;
            for (name, schema) in definitions {
                writeln!(out, "### {name}\n")?;
                if let Some(description) =
                    non_empty(schema.get("description").and_then(Value::as_str))
                {
                    writeln!(out, "{}\n", embedded(description))?;
                }
                let json = serde_json::to_string_pretty(schema)?;
                writeln!(out, "```json\n{json}\n```\n")?;
            }
        }
    }

    Ok(out)
}

fn render_operation(
    out: &mut String,
    entry: &Entry<'_>,
    consumes: &[&str],
    labels: &Labels,
) -> Result<()> {
    let Entry { method, path, shared, op } = entry;
    let title = operation_title(text(op, "summary"), text(op, "operationId"), method, path);

    writeln!(out, "### {title}\n")?;
    writeln!(out, "```http\n{method} {path}\n```\n")?;
    if let Some(description) = text(op, "description") {
        writeln!(out, "{}\n", embedded(description))?;
    }
    if let Some(operation_id) = text(op, "operationId") {
        writeln!(out, "**{}**: `{operation_id}`\n", labels.operation_id)?;
    }
    if op.get("deprecated").and_then(Value::as_bool) == Some(true) {
        writeln!(out, "> **{}**\n", labels.deprecated)?;
    }

    let own = op
        .get("parameters")
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice);
    let (body, parameters): (Vec<&Value>, Vec<&Value>) = shared
        .iter()
        .chain(own)
        .partition(|p| p.get("in").and_then(Value::as_str) == Some("body"));

    if !parameters.is_empty() {
        writeln!(out, "#### {}\n", labels.parameters)?;
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            labels.name, labels.location, labels.kind, labels.required, labels.description
        )?;
        writeln!(out, "| --- | --- | --- | --- | --- |")?;
        for parameter in parameters {
            if let Some(reference) = parameter.get("$ref").and_then(Value::as_str) {
                writeln!(out, "| {} | - | - | - | - |", ref_name(reference))?;
                continue;
            }
            let required = parameter.get("required").and_then(Value::as_bool) == Some(true);
            writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                cell(parameter.get("name").and_then(Value::as_str).unwrap_or("-")),
                cell(parameter.get("in").and_then(Value::as_str).unwrap_or("-")),
                cell(&label_of(parameter)),
                if required { labels.yes } else { labels.no },
                cell(parameter.get("description").and_then(Value::as_str).unwrap_or("")),
            )?;
        }
        out.push('\n');
    }

    if let Some(body) = body.first() {
        writeln!(out, "#### {}\n", labels.request_body)?;
        if let Some(description) = non_empty(body.get("description").and_then(Value::as_str)) {
            writeln!(out, "{}\n", embedded(description))?;
        }
        let schema = body
            .get("schema")
            .map_or_else(|| "-".to_string(), label_of);
        let mut media_types = strings(op.get("consumes"));
        if media_types.is_empty() {
            media_types = consumes.to_vec();
        }
        if media_types.is_empty() {
            media_types.push(DEFAULT_MEDIA_TYPE);
        }
        for media_type in media_types {
            writeln!(out, "- `{media_type}`: {schema}")?;
        }
        out.push('\n');
    }

    let responses = op
        .get("responses")
        .and_then(Value::as_object)
        .filter(|responses| !responses.is_empty());
    if let Some(responses) = responses {
        writeln!(out, "#### {}\n", labels.responses)?;
        writeln!(
            out,
            "| {} | {} | {} |",
            labels.status, labels.description, labels.schema
        )?;
        writeln!(out, "| --- | --- | --- |")?;
        for (status, response) in responses {
            if let Some(reference) = response.get("$ref").and_then(Value::as_str) {
                writeln!(out, "| {status} | {} | - |", ref_name(reference))?;
                continue;
            }
            let schema = response
                .get("schema")
                .map_or_else(|| "-".to_string(), label_of);
            writeln!(
                out,
                "| {status} | {} | {} |",
                cell(response.get("description").and_then(Value::as_str).unwrap_or("")),
                cell(&schema)
            )?;
        }
        out.push('\n');
    }

    Ok(())
}

fn text<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    non_empty(object.get(key).and_then(Value::as_str))
}

fn strings(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}
