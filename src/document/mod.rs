use serde::Serialize;

use crate::converter::Layer;

mod indexer;

pub use indexer::parse_modules;

/// Placeholder for a method or path that could not be recovered.
/// Treat it as "absent", not as a real HTTP verb or route.
pub const UNKNOWN: &str = "Unknown";

/// One converted OpenAPI source.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedDocument {
    pub source: String,
    pub markdown: String,
    pub modules: Vec<Module>,
    pub layer: Layer,
}

/// A level-2 heading of the converted Markdown and the APIs under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub name: String,
    pub description: String,
    pub apis: Vec<Api>,
}

/// A level-3 heading inside a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Api {
    pub name: String,
    pub path: String,
    pub method: String,
    pub summary: String,
}

impl Api {
    /// Whether method and path were recovered from the section body.
    pub fn has_route(&self) -> bool {
        self.method != UNKNOWN && self.path != UNKNOWN
    }
}
