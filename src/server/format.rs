//! Text blocks returned by the tools. Each block is wrapped in a pair of
//! start/end markers so the caller can tell where the payload begins and
//! ends; structured parts are YAML.

use serde::Serialize;

use crate::document::{Api, Module};
use crate::query::{ApiHit, QueryOutcome};
use crate::storage::{ApiQuery, BatchLookup};

#[derive(Serialize)]
struct ModuleListing<'a> {
    name: &'a str,
    description: &'a str,
    api_count: usize,
}

#[derive(Serialize)]
struct ApiListing<'a> {
    name: &'a str,
    method: &'a str,
    path: &'a str,
}

#[derive(Serialize)]
struct ModuleApis<'a> {
    module: &'a str,
    description: &'a str,
    apis: Vec<ApiListing<'a>>,
}

#[derive(Serialize)]
struct ModuleApisReport<'a> {
    found: Vec<ModuleApis<'a>>,
    not_found: &'a [String],
}

#[derive(Serialize)]
struct QuerySummary<'a> {
    matches: &'a [ApiHit],
    hint: &'static str,
}

fn wrap(marker: &str, body: &str) -> String {
    let body = body.trim_end();
    format!("[{marker} start]\n{body}\n[{marker} end]")
}

pub fn docs_list(modules: &[&Module]) -> serde_yaml::Result<String> {
    let listing: Vec<ModuleListing<'_>> = modules
        .iter()
        .map(|module| ModuleListing {
            name: &module.name,
            description: &module.description,
            api_count: module.apis.len(),
        })
        .collect();
    Ok(wrap("docs list", &serde_yaml::to_string(&listing)?))
}

pub fn module_apis(lookup: &BatchLookup<'_, String, Module>) -> serde_yaml::Result<String> {
    let report = ModuleApisReport {
        found: lookup
            .found
            .iter()
            .map(|found| ModuleApis {
                module: &found.item.name,
                description: &found.item.description,
                apis: found.item.apis.iter().map(api_listing).collect(),
            })
            .collect(),
        not_found: &lookup.not_found,
    };
    Ok(wrap("multi-module apis", &serde_yaml::to_string(&report)?))
}

/// `sections` pairs each found query with its Markdown section, if the
/// section could be cut from the source document.
pub fn api_details(
    sections: &[(&ApiQuery, &Api, Option<&str>)],
    not_found: &[ApiQuery],
) -> String {
    let mut body = String::new();
    for (query, api, section) in sections {
        body.push_str(&format!("# {}::{}\n\n", query.module_name, query.api_name));
        match section {
            Some(section) => body.push_str(section.trim_end()),
            None => body.push_str(&format!(
                "```http\n{} {}\n```",
                api.method, api.path
            )),
        }
        body.push_str("\n\n---\n\n");
    }
    if !not_found.is_empty() {
        body.push_str("Not found:\n");
        for query in not_found {
            body.push_str(&format!("- {}::{}\n", query.module_name, query.api_name));
        }
    }
    if body.is_empty() {
        body.push_str("No APIs requested.");
    }
    wrap("multi-api details", &body)
}

pub fn api_query(query: &str, outcome: &QueryOutcome) -> serde_yaml::Result<String> {
    let body = match outcome {
        QueryOutcome::NoResults => format!("No results for query: {query}"),
        QueryOutcome::Detail { hit, section } => format!(
            "Matched {} ({} {})\n\n{}",
            hit.query,
            hit.method,
            hit.path,
            section.trim_end()
        ),
        QueryOutcome::Summary { hits } => serde_yaml::to_string(&QuerySummary {
            matches: hits,
            hint: "Call query_api again with one `query` value above for full details.",
        })?,
    };
    Ok(wrap("api query", &body))
}

fn api_listing(api: &Api) -> ApiListing<'_> {
    ApiListing {
        name: &api.name,
        method: &api.method,
        path: &api.path,
    }
}
