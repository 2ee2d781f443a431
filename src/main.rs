use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use openapi_docs_mcp::config::parse_source_list;
use openapi_docs_mcp::converter::{Locale, TolerantConverter};
use openapi_docs_mcp::fetch::HttpFetcher;
use openapi_docs_mcp::server::ApiDocs;
use openapi_docs_mcp::storage::DocumentStore;
use rmcp::{ServiceExt, transport::stdio};

#[cfg(feature = "trace")]
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Cli {
    /// Comma-separated OpenAPI JSON sources (URLs or file paths)
    #[clap(long, env = "OPENAPI_DOC_URLS")]
    sources: String,
    /// Language of the generated Markdown labels (en, zh-cn)
    #[clap(long, env = "OPENAPI_DOC_LOCALE", default_value = "en")]
    locale: Locale,
    /// File that receives the server log (stdout carries the protocol)
    #[clap(long, default_value = "server.log")]
    log_file: PathBuf,
    /// Load every source at startup instead of on the first tool call
    #[clap(long)]
    preload: bool,
}

/// You can inspect the server using the Model Context Protocol Inspector.
/// npx @modelcontextprotocol/inspector cargo run -- --sources https://petstore3.swagger.io/api/v3/openapi.json

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    #[cfg(feature = "trace")]
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with_writer(std::fs::File::create(&args.log_file)?)
        .with_ansi(false)
        .init();

    tracing::info!("Starting MCP server");

    let sources = parse_source_list(&args.sources)?;
    tracing::info!("Serving {} OpenAPI sources: {:?}", sources.len(), sources);

    let store = Arc::new(DocumentStore::new(
        sources,
        Arc::new(HttpFetcher::new()?),
        Arc::new(TolerantConverter::standard(args.locale)),
    ));

    if args.preload {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            if let Err(e) = store.ensure_initialized().await {
                tracing::warn!("Preloading OpenAPI sources failed, will retry on demand: {}", e);
            }
        });
    }

    let service = ApiDocs::new(store)
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })?;

    service.waiting().await?;
    Ok(())
}
