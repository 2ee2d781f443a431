//! Tolerant OpenAPI to Markdown conversion.
//!
//! Conversion walks four layers, each weaker than the one before, and
//! stops at the first that succeeds:
//!
//! 1. the standard renderer (OpenAPI 3.0 or Swagger 2.0),
//! 2. the standard renderer over a sanitized copy of the document,
//! 3. a manual rebuild from the raw JSON shape,
//! 4. a structural summary of the top-level keys.
//!
//! [`TolerantConverter::convert`] never fails and never panics.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::Serialize;
use serde_json::Value;

pub mod manual;
pub mod renderer;
pub mod sanitize;
pub mod summary;
mod swagger;

pub use manual::MANUAL_MARKER;
pub use renderer::{Locale, MarkdownRenderer, StandardRenderer};
pub use sanitize::sanitize;

/// Notice prepended to output produced from a sanitized document.
pub const AUTO_CLEANED_NOTICE: &str = "> **Note**: this document was auto-cleaned before \
conversion. Unsupported vendor extensions were removed and non-ASCII `$ref` characters \
were replaced.\n\n";

/// Conversion layer that produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Standard,
    Sanitized,
    Manual,
    Summary,
    /// Every layer failed; the output is a fixed failure report.
    Failed,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layer::Standard => "standard",
            Layer::Sanitized => "sanitized",
            Layer::Manual => "manual",
            Layer::Summary => "summary",
            Layer::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why one layer gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerFailure {
    pub layer: Layer,
    pub message: String,
}

/// Result of converting one document.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub markdown: String,
    pub layer: Layer,
    pub failures: Vec<LayerFailure>,
}

/// Converts OpenAPI JSON to Markdown through the layered fallback chain.
pub struct TolerantConverter {
    renderer: Box<dyn MarkdownRenderer>,
    locale: Locale,
}

impl TolerantConverter {
    pub fn new(renderer: impl MarkdownRenderer + 'static, locale: Locale) -> Self {
        Self {
            renderer: Box::new(renderer),
            locale,
        }
    }

    /// Converter backed by [`StandardRenderer`].
    pub fn standard(locale: Locale) -> Self {
        Self::new(StandardRenderer, locale)
    }

    /// Convert a document, degrading through the layers as needed.
    pub fn convert(&self, spec: &Value) -> Conversion {
        let mut failures = Vec::new();

        match guarded(|| self.render(spec)) {
            Ok(markdown) => return finish(markdown, Layer::Standard, failures),
            Err(message) => record(&mut failures, Layer::Standard, message),
        }

        match guarded(|| self.render(&sanitize(spec))) {
            Ok(markdown) => {
                return finish(
                    format!("{AUTO_CLEANED_NOTICE}{markdown}"),
                    Layer::Sanitized,
                    failures,
                );
            }
            Err(message) => record(&mut failures, Layer::Sanitized, message),
        }

        match guarded(|| manual::render(spec)) {
            Ok(markdown) => return finish(markdown, Layer::Manual, failures),
            Err(message) => record(&mut failures, Layer::Manual, message),
        }

        match guarded(|| summary::summarize(spec, &failures)) {
            Ok(markdown) => finish(markdown, Layer::Summary, failures),
            Err(message) => {
                record(&mut failures, Layer::Summary, message);
                let markdown = failure_report(&failures);
                finish(markdown, Layer::Failed, failures)
            }
        }
    }

    fn render(&self, spec: &Value) -> anyhow::Result<String> {
        let markdown = self.renderer.render(spec, self.locale)?;
        if markdown.trim().is_empty() {
            anyhow::bail!("renderer produced empty output");
        }
        Ok(markdown)
    }
}

/// Convert `spec` with the standard renderer and return only the Markdown.
pub fn convert_to_markdown(spec: &Value, locale: Locale) -> String {
    TolerantConverter::standard(locale).convert(spec).markdown
}

fn finish(markdown: String, layer: Layer, failures: Vec<LayerFailure>) -> Conversion {
    tracing::debug!("Converted document with the {} layer", layer);
    Conversion {
        markdown,
        layer,
        failures,
    }
}

fn record(failures: &mut Vec<LayerFailure>, layer: Layer, message: String) {
    tracing::warn!("Conversion layer {} failed: {}", layer, message);
    failures.push(LayerFailure { layer, message });
}

fn guarded<F>(layer: F) -> Result<String, String>
where
    F: FnOnce() -> anyhow::Result<String>,
{
    match catch_unwind(AssertUnwindSafe(layer)) {
        Ok(Ok(markdown)) => Ok(markdown),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn failure_report(failures: &[LayerFailure]) -> String {
    let mut report = String::from(
        "# Conversion Failed\n\nEvery conversion layer failed for this document.\n\n",
    );
    for failure in failures {
        report.push_str(&format!("- {}: {}\n", failure.layer, failure.message));
    }
    report
}
