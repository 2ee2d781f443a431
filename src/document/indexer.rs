use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use regex::Regex;

use super::{Api, Module, UNKNOWN};
use crate::section::heading_spans;

static BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").unwrap());
static ROUTE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]+)[ \t]+(\S.*?)[ \t]*\r?$").unwrap());

/// Parse converted Markdown into modules (`## `) and their APIs (`### `),
/// in document order.
pub fn parse_modules(markdown: &str) -> Vec<Module> {
    heading_spans(markdown, "##")
        .into_iter()
        .map(|span| {
            let content = span.body(markdown);
            let api_spans = heading_spans(content, "###");
            let apis_start = api_spans.first().map_or(content.len(), |api| api.start);
            let apis = api_spans
                .iter()
                .map(|api| parse_api(api.name, api.body(content)))
                .collect();

            Module {
                name: span.name.to_string(),
                description: first_paragraph(&content[..apis_start]),
                apis,
            }
        })
        .collect()
}

fn first_paragraph(text: &str) -> String {
    let text = text.trim();
    let end = BLANK_LINE.find(text).map_or(text.len(), |m| m.start());
    text[..end].trim().to_string()
}

fn parse_api(name: &str, content: &str) -> Api {
    let (method, path) = route(content)
        .unwrap_or_else(|| (UNKNOWN.to_string(), UNKNOWN.to_string()));
    Api {
        name: name.to_string(),
        path,
        method,
        summary: name.to_string(),
    }
}

/// Method and path from the first ```` ```http ```` fence whose first line
/// reads `METHOD path`.
fn route(content: &str) -> Option<(String, String)> {
    let mut in_http_fence = false;
    let mut fence = String::new();

    for event in Parser::new(content) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                in_http_fence = info.split_whitespace().next() == Some("http");
                fence.clear();
            }
            Event::Text(text) if in_http_fence => fence.push_str(&text),
            Event::End(TagEnd::CodeBlock) if in_http_fence => {
                in_http_fence = false;
                let first_line = fence.lines().next().unwrap_or_default();
                if let Some(cap) = ROUTE_LINE.captures(first_line) {
                    return Some((cap[1].to_string(), cap[2].to_string()));
                }
            }
            _ => {}
        }
    }

    None
}
