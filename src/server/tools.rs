use std::sync::Arc;

use rmcp::{Error as McpError, ServerHandler, model::*, schemars, tool};
use serde::Deserialize;

use super::format;
use crate::query::{DEFAULT_LIMIT, DisplayMode, query_apis};
use crate::storage::{ApiQuery, DocumentStore};

#[derive(Clone)]
pub struct ApiDocs {
    pub store: Arc<DocumentStore>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetModuleApisRequest {
    #[schemars(description = "module names exactly as returned by list_docs")]
    pub module_names: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ApiRef {
    #[schemars(description = "module name exactly as returned by list_docs")]
    pub module_name: String,
    #[schemars(description = "API name exactly as returned by get_module_apis")]
    pub api_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetApiDetailsRequest {
    #[schemars(description = "the APIs to describe")]
    pub apis: Vec<ApiRef>,
}

#[derive(Debug, Clone, Copy, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    Full,
    Summary,
    Auto,
}

impl From<QueryMode> for DisplayMode {
    fn from(mode: QueryMode) -> Self {
        match mode {
            QueryMode::Full => DisplayMode::Full,
            QueryMode::Summary => DisplayMode::Summary,
            QueryMode::Auto => DisplayMode::Auto,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QueryApiRequest {
    #[schemars(
        description = "free text, `Module::API` for an exact API, or `METHOD /path` for an exact route"
    )]
    pub query: String,

    #[schemars(description = "the maximum number of matches to return (default 10)")]
    #[serde(default)]
    pub limit: Option<usize>,

    #[schemars(
        description = "`full` for the best match's documentation, `summary` for a match list, `auto` (default) for full only when exactly one API matches"
    )]
    #[serde(default)]
    pub mode: Option<QueryMode>,
}

#[tool(tool_box)]
impl ApiDocs {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    async fn ensure_loaded(&self) -> Result<(), McpError> {
        self.store.ensure_initialized().await.map_err(|e| {
            tracing::error!("Failed to load OpenAPI documents: {}", e);
            McpError::internal_error(e.to_string(), None)
        })
    }

    #[tool(description = "List every documented module with its description and API count")]
    async fn list_docs(&self) -> Result<CallToolResult, McpError> {
        self.ensure_loaded().await?;
        tracing::debug!("list_docs");

        let text = format::docs_list(&self.store.all_modules()).map_err(yaml_error)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "List the APIs (name, method, path) of one or more modules")]
    async fn get_module_apis(
        &self,
        #[tool(aggr)] GetModuleApisRequest { module_names }: GetModuleApisRequest,
    ) -> Result<CallToolResult, McpError> {
        self.ensure_loaded().await?;
        tracing::debug!("get_module_apis {:?}", module_names);

        let lookup = self.store.find_modules(&module_names);
        let text = format::module_apis(&lookup).map_err(yaml_error)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Get the full documentation of one or more APIs")]
    async fn get_api_details(
        &self,
        #[tool(aggr)] GetApiDetailsRequest { apis }: GetApiDetailsRequest,
    ) -> Result<CallToolResult, McpError> {
        self.ensure_loaded().await?;
        tracing::debug!("get_api_details for {} APIs", apis.len());

        let queries: Vec<ApiQuery> = apis
            .into_iter()
            .map(|api| ApiQuery::new(api.module_name, api.api_name))
            .collect();
        let lookup = self.store.find_apis(&queries);
        let sections: Vec<_> = lookup
            .found
            .iter()
            .map(|found| {
                let section = self
                    .store
                    .api_section(&found.query.module_name, &found.query.api_name);
                (&found.query, found.item, section)
            })
            .collect();

        let text = format::api_details(&sections, &lookup.not_found);
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Search APIs by name, path, module or method")]
    async fn query_api(
        &self,
        #[tool(aggr)] QueryApiRequest { query, limit, mode }: QueryApiRequest,
    ) -> Result<CallToolResult, McpError> {
        self.ensure_loaded().await?;
        tracing::debug!("query_api '{}'", query);

        let limit = limit.unwrap_or(DEFAULT_LIMIT).max(1);
        let mode = mode.map(DisplayMode::from).unwrap_or_default();
        let result = query_apis(self.store.documents(), &query, limit, mode);

        let text = format::api_query(&query, &result.outcome).map_err(yaml_error)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

fn yaml_error(e: serde_yaml::Error) -> McpError {
    McpError::internal_error(format!("failed to format result: {e}"), None)
}

#[tool(tool_box)]
impl ServerHandler for ApiDocs {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some("This server exposes OpenAPI documentation. Use 'list_docs' to see the modules, 'get_module_apis' to list the APIs of modules, 'get_api_details' for the documentation of specific APIs, or 'query_api' to search by name, path or `METHOD /path`.".to_string()),
        }
    }
}
