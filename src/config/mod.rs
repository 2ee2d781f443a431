use crate::error::{DocsError, Result};

/// Environment variable holding the comma-separated source list.
pub const SOURCES_ENV: &str = "OPENAPI_DOC_URLS";

/// Split a comma-separated source list into trimmed, non-empty entries.
///
/// An empty result is a fatal configuration error: the server has nothing
/// to serve without at least one source.
pub fn parse_source_list(raw: &str) -> Result<Vec<String>> {
    let sources: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect();

    if sources.is_empty() {
        return Err(DocsError::Config(format!(
            "no OpenAPI sources configured; set --sources or {SOURCES_ENV}"
        )));
    }

    Ok(sources)
}
