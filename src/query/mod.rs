use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::document::{Api, ParsedDocument, UNKNOWN};
use crate::section::extract_section;

pub mod scorer;

use scorer::{Field, weighted_score};

/// Result count used when the caller gives none.
pub const DEFAULT_LIMIT: usize = 10;

const API_WEIGHT: f64 = 0.5;
const PATH_WEIGHT: f64 = 0.3;
const MODULE_WEIGHT: f64 = 0.15;
const METHOD_WEIGHT: f64 = 0.05;

static METHOD_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)\s+(/\S*)").unwrap());

/// How query results are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Full section of the best match.
    Full,
    /// List of matches.
    Summary,
    /// Full for a single match, a list otherwise.
    #[default]
    Auto,
}

/// Which matching strategy produced the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ModuleApi,
    MethodPath,
    Fuzzy,
}

/// One matched API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiHit {
    pub module: String,
    pub api: String,
    pub method: String,
    pub path: String,
    /// Query that resolves to exactly this API.
    pub query: String,
    #[serde(skip)]
    pub document: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    NoResults,
    Detail { hit: ApiHit, section: String },
    Summary { hits: Vec<ApiHit> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub strategy: Strategy,
    pub outcome: QueryOutcome,
}

#[derive(Clone, Copy)]
struct Candidate<'a> {
    document: usize,
    module: &'a str,
    api: &'a Api,
}

impl Candidate<'_> {
    fn hit(&self) -> ApiHit {
        ApiHit {
            module: self.module.to_string(),
            api: self.api.name.clone(),
            method: self.api.method.clone(),
            path: self.api.path.clone(),
            query: format!("{}::{}", self.module, self.api.name),
            document: self.document,
        }
    }
}

/// Find APIs across `documents` matching a free-text query.
///
/// `Module::Api` and `METHOD /path` queries are matched exactly first; if
/// they do not apply or find nothing, APIs are ranked by fuzzy similarity.
pub fn query_apis(
    documents: &[ParsedDocument],
    query: &str,
    limit: usize,
    mode: DisplayMode,
) -> QueryResult {
    let query = query.trim();
    let candidates = candidates(documents);

    let (strategy, mut matches) = match direct_matches(&candidates, query) {
        Some((strategy, matches)) if !matches.is_empty() => (strategy, matches),
        _ => (Strategy::Fuzzy, rank(&candidates, query)),
    };
    matches.truncate(limit);
    tracing::debug!(
        "Query '{}' matched {} APIs ({:?})",
        query,
        matches.len(),
        strategy
    );

    let outcome = match (mode, matches.as_slice()) {
        (_, []) => QueryOutcome::NoResults,
        (DisplayMode::Full, [best, ..]) | (DisplayMode::Auto, [best]) => QueryOutcome::Detail {
            hit: best.hit(),
            section: detail(documents, best),
        },
        _ => QueryOutcome::Summary {
            hits: matches.iter().map(Candidate::hit).collect(),
        },
    };

    QueryResult { strategy, outcome }
}

fn candidates(documents: &[ParsedDocument]) -> Vec<Candidate<'_>> {
    documents
        .iter()
        .enumerate()
        .flat_map(|(document, parsed)| {
            parsed.modules.iter().flat_map(move |module| {
                module.apis.iter().map(move |api| Candidate {
                    document,
                    module: &module.name,
                    api,
                })
            })
        })
        .collect()
}

fn direct_matches<'a>(
    candidates: &[Candidate<'a>],
    query: &str,
) -> Option<(Strategy, Vec<Candidate<'a>>)> {
    if let Some((module, api)) = query.split_once("::") {
        let (module, api) = (module.trim().to_lowercase(), api.trim().to_lowercase());
        let matches = candidates
            .iter()
            .filter(|c| c.module.to_lowercase() == module && c.api.name.to_lowercase() == api)
            .copied()
            .collect();
        return Some((Strategy::ModuleApi, matches));
    }

    let cap = METHOD_PATH.captures(query)?;
    let method = cap[1].to_uppercase();
    let path = &cap[2];
    let matches = candidates
        .iter()
        .filter(|c| c.api.method.to_uppercase() == method && c.api.path == path)
        .copied()
        .collect();
    Some((Strategy::MethodPath, matches))
}

fn rank<'a>(candidates: &[Candidate<'a>], query: &str) -> Vec<Candidate<'a>> {
    let mut scored: Vec<(f64, Candidate<'a>)> = candidates
        .iter()
        .filter_map(|candidate| {
            let api = candidate.api;
            // The sentinel is not searchable text; an empty field never matches.
            let known = |value: &'a str| if value == UNKNOWN { "" } else { value };
            let fields = [
                Field { text: &api.name, weight: API_WEIGHT },
                Field { text: known(api.path.as_str()), weight: PATH_WEIGHT },
                Field { text: candidate.module, weight: MODULE_WEIGHT },
                Field { text: known(api.method.as_str()), weight: METHOD_WEIGHT },
            ];
            weighted_score(query, &fields).map(|score| (score, *candidate))
        })
        .collect();

    // Stable, so equal scores keep document order.
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, candidate)| candidate).collect()
}

fn detail(documents: &[ParsedDocument], candidate: &Candidate<'_>) -> String {
    documents
        .get(candidate.document)
        .and_then(|document| extract_section(&document.markdown, candidate.module, "##"))
        .and_then(|module| extract_section(module, &candidate.api.name, "###"))
        .map(ToString::to_string)
        .unwrap_or_else(|| {
            format!(
                "### {}\n\n```http\n{} {}\n```\n",
                candidate.api.name, candidate.api.method, candidate.api.path
            )
        })
}
