use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use openapiv3::{
    OpenAPI, Operation, Parameter, ParameterData, ParameterSchemaOrContent, PathItem, ReferenceOr,
    StatusCode,
};
use serde::Serialize;
use serde_json::Value;

use super::swagger;

/// Group name for operations that declare no tag.
pub const DEFAULT_GROUP: &str = "Default";

/// Turns an OpenAPI document into Markdown.
///
/// Implementations may reject documents they cannot handle; the tolerant
/// converter takes care of falling back.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, spec: &Value, locale: Locale) -> Result<String>;
}

/// Language used for the labels of rendered documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    ZhCn,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "en" | "en-us" => Ok(Locale::En),
            "zh" | "zh-cn" => Ok(Locale::ZhCn),
            other => Err(format!("unsupported locale '{other}' (expected en or zh-cn)")),
        }
    }
}

pub(crate) struct Labels {
    pub(crate) version: &'static str,
    pub(crate) servers: &'static str,
    pub(crate) operation_id: &'static str,
    pub(crate) deprecated: &'static str,
    pub(crate) parameters: &'static str,
    pub(crate) request_body: &'static str,
    pub(crate) responses: &'static str,
    pub(crate) name: &'static str,
    pub(crate) location: &'static str,
    pub(crate) kind: &'static str,
    pub(crate) required: &'static str,
    pub(crate) description: &'static str,
    pub(crate) status: &'static str,
    pub(crate) schema: &'static str,
    pub(crate) yes: &'static str,
    pub(crate) no: &'static str,
    pub(crate) schemas: &'static str,
}

const EN: Labels = Labels {
    version: "Version",
    servers: "Servers",
    operation_id: "Operation ID",
    deprecated: "Deprecated",
    parameters: "Parameters",
    request_body: "Request Body",
    responses: "Responses",
    name: "Name",
    location: "In",
    kind: "Type",
    required: "Required",
    description: "Description",
    status: "Status",
    schema: "Schema",
    yes: "yes",
    no: "no",
    schemas: "Schemas",
};

const ZH_CN: Labels = Labels {
    version: "版本",
    servers: "服务器",
    operation_id: "操作 ID",
    deprecated: "已废弃",
    parameters: "请求参数",
    request_body: "请求体",
    responses: "响应",
    name: "名称",
    location: "位置",
    kind: "类型",
    required: "必填",
    description: "说明",
    status: "状态码",
    schema: "数据结构",
    yes: "是",
    no: "否",
    schemas: "数据模型",
};

impl Locale {
    fn labels(self) -> &'static Labels {
        match self {
            Locale::En => &EN,
            Locale::ZhCn => &ZH_CN,
        }
    }
}

/// Strict renderer for OpenAPI 3.0 (through the `openapiv3` model) and
/// Swagger 2.0 documents.
///
/// Structurally invalid documents and `$ref` values that are not valid URI
/// references are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRenderer;

impl MarkdownRenderer for StandardRenderer {
    fn render(&self, spec: &Value, locale: Locale) -> Result<String> {
        check_references(spec)?;
        if swagger::is_swagger(spec) {
            return swagger::render(spec, locale.labels());
        }
        let api: OpenAPI = serde_json::from_value(spec.clone())
            .context("document is not a valid OpenAPI 3.0 description")?;
        render_document(&api, locale.labels())
    }
}

fn check_references(value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "$ref" {
                    if let Value::String(reference) = child {
                        if !is_uri_reference(reference) {
                            bail!("invalid $ref '{reference}': not a valid URI reference");
                        }
                    }
                } else {
                    check_references(child)?;
                }
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(check_references),
        _ => Ok(()),
    }
}

fn is_uri_reference(reference: &str) -> bool {
    reference.chars().all(|c| {
        c.is_ascii_graphic() && !matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`')
    })
}

struct Entry<'a> {
    method: &'static str,
    path: &'a str,
    item: &'a PathItem,
    op: &'a Operation,
}

fn operations(item: &PathItem) -> impl Iterator<Item = (&'static str, &Operation)> {
    [
        ("GET", item.get.as_ref()),
        ("POST", item.post.as_ref()),
        ("PUT", item.put.as_ref()),
        ("PATCH", item.patch.as_ref()),
        ("DELETE", item.delete.as_ref()),
        ("HEAD", item.head.as_ref()),
        ("OPTIONS", item.options.as_ref()),
        ("TRACE", item.trace.as_ref()),
    ]
    .into_iter()
    .filter_map(|(method, op)| op.map(|op| (method, op)))
}

fn render_document(api: &OpenAPI, labels: &Labels) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "# {}\n", single_line(&api.info.title))?;
    if let Some(description) = non_empty(api.info.description.as_deref()) {
        writeln!(out, "{}\n", embedded(description))?;
    }
    writeln!(out, "**{}**: {}\n", labels.version, api.info.version)?;
    if !api.servers.is_empty() {
        writeln!(out, "**{}**:\n", labels.servers)?;
        for server in &api.servers {
            match non_empty(server.description.as_deref()) {
                Some(description) => writeln!(out, "- `{}`: {}", server.url, single_line(description))?,
                None => writeln!(out, "- `{}`", server.url)?,
            }
        }
        out.push('\n');
    }

    // Declared tags keep their declaration order; the rest follow in order
    // of first use.
    let mut groups: Vec<(String, Vec<Entry<'_>>)> = api
        .tags
        .iter()
        .map(|tag| (group_name(&tag.name), Vec::new()))
        .collect();
    for (path, item) in &api.paths.paths {
        let ReferenceOr::Item(item) = item else {
            continue;
        };
        for (method, op) in operations(item) {
            let tag = group_name(op.tags.first().map_or("", String::as_str));
            let entry = Entry { method, path, item, op };
            match groups.iter_mut().find(|(name, _)| *name == tag) {
                Some((_, entries)) => entries.push(entry),
                None => groups.push((tag, vec![entry])),
            }
        }
    }

    for (tag, entries) in groups.iter().filter(|(_, entries)| !entries.is_empty()) {
        writeln!(out, "## {tag}\n")?;
        let description = api
            .tags
            .iter()
            .find(|t| group_name(&t.name) == *tag)
            .and_then(|t| non_empty(t.description.as_deref()));
        if let Some(description) = description {
            writeln!(out, "{}\n", embedded(description))?;
        }
        for entry in entries {
            render_operation(&mut out, entry, labels)?;
        }
    }

    if let Some(components) = &api.components {
        if !components.schemas.is_empty() {
            writeln!(out, "## {}\n", labels.schemas)?;
            for (name, schema) in &components.schemas {
                writeln!(out, "### {name}\n")?;
                if let ReferenceOr::Item(schema) = schema {
                    if let Some(description) = non_empty(schema.schema_data.description.as_deref()) {
                        writeln!(out, "{}\n", embedded(description))?;
                    }
                }
                let json = serde_json::to_string_pretty(schema)?;
                writeln!(out, "```json\n{json}\n```\n")?;
            }
        }
    }

    Ok(out)
}

/// Heading used for an operation: summary, then operation id, then
/// `METHOD path`.
pub(crate) fn operation_title(
    summary: Option<&str>,
    operation_id: Option<&str>,
    method: &str,
    path: &str,
) -> String {
    non_empty(summary)
        .or_else(|| non_empty(operation_id))
        .map(single_line)
        .unwrap_or_else(|| format!("{method} {path}"))
}

fn render_operation(out: &mut String, entry: &Entry<'_>, labels: &Labels) -> Result<()> {
    let Entry { method, path, item, op } = entry;
    let title = operation_title(
        op.summary.as_deref(),
        op.operation_id.as_deref(),
        method,
        path,
    );

    writeln!(out, "### {title}\n")?;
    writeln!(out, "```http\n{method} {path}\n```\n")?;
    if let Some(description) = non_empty(op.description.as_deref()) {
        writeln!(out, "{}\n", embedded(description))?;
    }
    if let Some(operation_id) = non_empty(op.operation_id.as_deref()) {
        writeln!(out, "**{}**: `{operation_id}`\n", labels.operation_id)?;
    }
    if op.deprecated {
        writeln!(out, "> **{}**\n", labels.deprecated)?;
    }

    let parameters: Vec<&ReferenceOr<Parameter>> =
        item.parameters.iter().chain(op.parameters.iter()).collect();
    if !parameters.is_empty() {
        writeln!(out, "#### {}\n", labels.parameters)?;
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            labels.name, labels.location, labels.kind, labels.required, labels.description
        )?;
        writeln!(out, "| --- | --- | --- | --- | --- |")?;
        for parameter in parameters {
            match parameter {
                ReferenceOr::Reference { reference } => {
                    writeln!(out, "| {} | - | - | - | - |", ref_name(reference))?;
                }
                ReferenceOr::Item(parameter) => {
                    let (data, location) = parameter_parts(parameter);
                    let kind = match &data.format {
                        ParameterSchemaOrContent::Schema(schema) => schema_label(schema),
                        ParameterSchemaOrContent::Content(_) => "-".to_string(),
                    };
                    writeln!(
                        out,
                        "| {} | {location} | {} | {} | {} |",
                        cell(&data.name),
                        cell(&kind),
                        if data.required { labels.yes } else { labels.no },
                        cell(data.description.as_deref().unwrap_or("")),
                    )?;
                }
            }
        }
        out.push('\n');
    }

    if let Some(body) = &op.request_body {
        writeln!(out, "#### {}\n", labels.request_body)?;
        match body {
            ReferenceOr::Reference { reference } => {
                writeln!(out, "- `{}`", ref_name(reference))?;
            }
            ReferenceOr::Item(body) => {
                if let Some(description) = non_empty(body.description.as_deref()) {
                    writeln!(out, "{}\n", embedded(description))?;
                }
                for (media_type, content) in &body.content {
                    let schema = content
                        .schema
                        .as_ref()
                        .map_or_else(|| "-".to_string(), |schema| schema_label(schema));
                    writeln!(out, "- `{media_type}`: {schema}")?;
                }
            }
        }
        out.push('\n');
    }

    let responses: Vec<(String, &ReferenceOr<openapiv3::Response>)> = op
        .responses
        .responses
        .iter()
        .map(|(status, response)| (status_label(status), response))
        .chain(
            op.responses
                .default
                .iter()
                .map(|response| ("default".to_string(), response)),
        )
        .collect();
    if !responses.is_empty() {
        writeln!(out, "#### {}\n", labels.responses)?;
        writeln!(
            out,
            "| {} | {} | {} |",
            labels.status, labels.description, labels.schema
        )?;
        writeln!(out, "| --- | --- | --- |")?;
        for (status, response) in responses {
            match response {
                ReferenceOr::Reference { reference } => {
                    writeln!(out, "| {status} | {} | - |", ref_name(reference))?;
                }
                ReferenceOr::Item(response) => {
                    let schema = response
                        .content
                        .values()
                        .find_map(|media| media.schema.as_ref())
                        .map_or_else(|| "-".to_string(), |schema| schema_label(schema));
                    writeln!(
                        out,
                        "| {status} | {} | {} |",
                        cell(&response.description),
                        cell(&schema)
                    )?;
                }
            }
        }
        out.push('\n');
    }

    Ok(())
}

fn parameter_parts(parameter: &Parameter) -> (&ParameterData, &'static str) {
    match parameter {
        Parameter::Query { parameter_data, .. } => (parameter_data, "query"),
        Parameter::Header { parameter_data, .. } => (parameter_data, "header"),
        Parameter::Path { parameter_data, .. } => (parameter_data, "path"),
        Parameter::Cookie { parameter_data, .. } => (parameter_data, "cookie"),
    }
}

fn status_label(status: &StatusCode) -> String {
    match status {
        StatusCode::Code(code) => code.to_string(),
        StatusCode::Range(range) => format!("{range}XX"),
    }
}

fn schema_label(schema: &impl Serialize) -> String {
    serde_json::to_value(schema).map_or_else(|_| "-".to_string(), |value| label_of(&value))
}

pub(crate) fn label_of(value: &Value) -> String {
    if let Some(reference) = value.get("$ref").and_then(Value::as_str) {
        return ref_name(reference).to_string();
    }
    match value.get("type").and_then(Value::as_str) {
        Some("array") => format!(
            "array<{}>",
            value.get("items").map_or_else(|| "any".to_string(), label_of)
        ),
        Some(kind) => match value.get("format").and_then(Value::as_str) {
            Some(format) => format!("{kind}({format})"),
            None => kind.to_string(),
        },
        None if value.get("properties").is_some() => "object".to_string(),
        None => "any".to_string(),
    }
}

pub(crate) fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

pub(crate) fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

pub(crate) fn single_line(text: &str) -> String {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" ")
}

pub(crate) fn cell(text: &str) -> String {
    single_line(text).replace('|', "\\|")
}

/// Module heading for a tag: folded onto one line, `Default` when blank.
pub(crate) fn group_name(tag: &str) -> String {
    let name = single_line(tag);
    if name.is_empty() {
        DEFAULT_GROUP.to_string()
    } else {
        name
    }
}

/// Free text placed under a heading. Lines that would start a Markdown
/// heading get their `#` escaped so they cannot open a module or API.
pub(crate) fn embedded(text: &str) -> String {
    text.lines()
        .map(|line| {
            let marker = line.len() - line.trim_start().len();
            if line[marker..].starts_with('#') {
                format!("{}\\{}", &line[..marker], &line[marker..])
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
