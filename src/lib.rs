//! # OpenAPI Docs MCP Server
//!
//! A Model-Context-Provider (MCP) server that loads OpenAPI documents and
//! serves them to an LLM as navigable Markdown.
//!
//! ## Features
//!
//! - Fetch one or more OpenAPI/Swagger JSON sources
//! - Convert each into Markdown through a fault-tolerant, layered pipeline
//! - Index the Markdown into modules and APIs
//! - Look APIs up by exact name, in batches, or by fuzzy search
//!
//! ## Modules
//!
//! - `server`: MCP server implementation and tools
//! - `storage`: Document store with single-flight initialization
//! - `document`: Parsed document model and Markdown indexer
//! - `converter`: OpenAPI to Markdown conversion
//! - `section`: Markdown section extraction
//! - `query`: Exact and fuzzy API search
//! - `fetch`: Source loading over HTTP or from disk
//! - `config`: Source list configuration
//! - `error`: Error types

/// Source list configuration
pub mod config;
/// OpenAPI to Markdown conversion
pub mod converter;
/// Parsed document model and indexing
pub mod document;
/// Error types
pub mod error;
/// Source fetching
pub mod fetch;
/// API search
pub mod query;
/// Markdown section extraction
pub mod section;
/// Server implementation and MCP tools
pub mod server;
/// Document storage and retrieval
pub mod storage;
