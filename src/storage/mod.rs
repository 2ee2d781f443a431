use std::sync::{Arc, OnceLock};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::converter::TolerantConverter;
use crate::document::{Api, Module, ParsedDocument, parse_modules};
use crate::error::Result;
use crate::fetch::SourceFetcher;
use crate::section::extract_section;

type Documents = Arc<Vec<ParsedDocument>>;
type PendingLoad = Shared<BoxFuture<'static, Result<Documents>>>;

/// A `(module, api)` name pair, as asked for by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiQuery {
    pub module_name: String,
    pub api_name: String,
}

impl ApiQuery {
    pub fn new(module_name: impl Into<String>, api_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            api_name: api_name.into(),
        }
    }
}

/// A lookup hit together with the query that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Found<'a, Q, T> {
    pub query: Q,
    pub item: &'a T,
}

/// Outcome of a batch lookup. Both lists keep the order of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchLookup<'a, Q, T> {
    pub found: Vec<Found<'a, Q, T>>,
    pub not_found: Vec<Q>,
}

/// Holds the converted documents of every configured source.
///
/// Sources are loaded lazily by [`DocumentStore::ensure_initialized`]. The
/// lookup methods read whatever is loaded and see nothing before
/// initialization has succeeded.
pub struct DocumentStore {
    sources: Arc<[String]>,
    fetcher: Arc<dyn SourceFetcher>,
    converter: Arc<TolerantConverter>,
    documents: OnceLock<Documents>,
    pending: Mutex<Option<PendingLoad>>,
}

impl DocumentStore {
    pub fn new(
        sources: Vec<String>,
        fetcher: Arc<dyn SourceFetcher>,
        converter: Arc<TolerantConverter>,
    ) -> Self {
        Self {
            sources: sources.into(),
            fetcher,
            converter,
            documents: OnceLock::new(),
            pending: Mutex::new(None),
        }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn is_initialized(&self) -> bool {
        self.documents.get().is_some()
    }

    /// Load every source once.
    ///
    /// Callers arriving while a load is in flight wait on that same load and
    /// all receive its outcome. A failed load keeps nothing, so the next
    /// call starts over.
    pub async fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }

        let load = {
            let mut pending = self.pending.lock().await;
            if self.is_initialized() {
                return Ok(());
            }
            match pending.as_ref() {
                Some(load) => {
                    tracing::debug!("Joining in-flight document initialization");
                    load.clone()
                }
                None => {
                    tracing::info!("Initializing {} OpenAPI sources", self.sources.len());
                    let load = load_sources(
                        Arc::clone(&self.sources),
                        Arc::clone(&self.fetcher),
                        Arc::clone(&self.converter),
                    )
                    .boxed()
                    .shared();
                    *pending = Some(load.clone());
                    load
                }
            }
        };

        let outcome = load.clone().await;

        // The first waiter to get here publishes the outcome and clears the
        // slot; later waiters find a different (or no) load there.
        let mut pending = self.pending.lock().await;
        if pending.as_ref().is_some_and(|current| current.ptr_eq(&load)) {
            *pending = None;
            match &outcome {
                Ok(documents) => {
                    let _ = self.documents.set(Arc::clone(documents));
                }
                Err(e) => tracing::error!("Document initialization failed: {}", e),
            }
        }

        outcome.map(|_| ())
    }

    /// Loaded documents, in configured source order.
    pub fn documents(&self) -> &[ParsedDocument] {
        self.documents
            .get()
            .map(|documents| documents.as_slice())
            .unwrap_or_default()
    }

    /// Every module of every document, document by document.
    pub fn all_modules(&self) -> Vec<&Module> {
        self.documents()
            .iter()
            .flat_map(|document| document.modules.iter())
            .collect()
    }

    /// First module named exactly `name`, scanning documents in order.
    pub fn find_module(&self, name: &str) -> Option<&Module> {
        self.locate_module(name).map(|(_, module)| module)
    }

    /// First API named exactly `api_name` inside [`Self::find_module`]'s hit.
    pub fn find_api(&self, module_name: &str, api_name: &str) -> Option<&Api> {
        self.find_module(module_name)?
            .apis
            .iter()
            .find(|api| api.name == api_name)
    }

    pub fn find_modules<S: AsRef<str>>(&self, names: &[S]) -> BatchLookup<'_, String, Module> {
        let mut lookup = BatchLookup {
            found: Vec::new(),
            not_found: Vec::new(),
        };
        for name in names {
            let name = name.as_ref();
            match self.find_module(name) {
                Some(item) => lookup.found.push(Found {
                    query: name.to_string(),
                    item,
                }),
                None => lookup.not_found.push(name.to_string()),
            }
        }
        lookup
    }

    pub fn find_apis(&self, queries: &[ApiQuery]) -> BatchLookup<'_, ApiQuery, Api> {
        let mut lookup = BatchLookup {
            found: Vec::new(),
            not_found: Vec::new(),
        };
        for query in queries {
            match self.find_api(&query.module_name, &query.api_name) {
                Some(item) => lookup.found.push(Found {
                    query: query.clone(),
                    item,
                }),
                None => lookup.not_found.push(query.clone()),
            }
        }
        lookup
    }

    /// Markdown section of an API, cut from the document that owns the
    /// module [`Self::find_module`] resolves to.
    pub fn api_section(&self, module_name: &str, api_name: &str) -> Option<&str> {
        let (document, _) = self.locate_module(module_name)?;
        let module_section = extract_section(&document.markdown, module_name, "##")?;
        extract_section(module_section, api_name, "###")
    }

    fn locate_module(&self, name: &str) -> Option<(&ParsedDocument, &Module)> {
        self.documents().iter().find_map(|document| {
            document
                .modules
                .iter()
                .find(|module| module.name == name)
                .map(|module| (document, module))
        })
    }
}

async fn load_sources(
    sources: Arc<[String]>,
    fetcher: Arc<dyn SourceFetcher>,
    converter: Arc<TolerantConverter>,
) -> Result<Documents> {
    let mut documents = Vec::with_capacity(sources.len());

    for source in sources.iter() {
        tracing::info!("Loading OpenAPI source {}", source);
        let spec = fetcher.fetch(source).await?;
        let conversion = converter.convert(&spec);
        let modules = parse_modules(&conversion.markdown);
        tracing::info!(
            "Indexed {} modules and {} APIs from {} ({} layer)",
            modules.len(),
            modules.iter().map(|m| m.apis.len()).sum::<usize>(),
            source,
            conversion.layer
        );

        documents.push(ParsedDocument {
            source: source.clone(),
            markdown: conversion.markdown,
            modules,
            layer: conversion.layer,
        });
    }

    Ok(Arc::new(documents))
}
