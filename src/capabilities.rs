//! The four Context7 capabilities.
//!
//! Each one checks its required fields, decodes the body, forwards it with
//! [`Context7Client`] and relays the upstream JSON untouched. Upstream
//! failures become a 500 envelope carrying the upstream code, or the
//! capability's default code when the upstream gave none.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{error, info};

use crate::client::{Context7Client, UpstreamError};
use crate::error::{AppError, MISSING_PARAMETERS, MISSING_PROJECT_ID};
use crate::models::{
    decode, has_fields, ParsePayload, ParseRepositoryRequest, ProjectStatusRequest,
    RefreshPayload, RefreshProjectRequest, SearchContextRequest,
};
use crate::traits::Capability;

pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const STATUS_ERROR: &str = "STATUS_ERROR";
pub const REFRESH_ERROR: &str = "REFRESH_ERROR";
pub const SEARCH_ERROR: &str = "SEARCH_ERROR";

fn upstream_failure(capability: &str, err: UpstreamError, default_code: &str) -> AppError {
    error!(capability, error = %err, "Upstream call failed");
    AppError::upstream(&err, default_code)
}

fn project_id_schema() -> Value {
    json!({ "type": "string", "description": "Unique identifier for the project" })
}

// ============ parse_repository ============

/// `POST /api/parse`: submit a repository or website for parsing.
pub struct ParseRepository;

#[async_trait]
impl Capability for ParseRepository {
    fn name(&self) -> &str {
        "parse_repository"
    }

    fn description(&self) -> &str {
        "Parse a code repository or website into structured AI context"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["url", "type"],
            "properties": {
                "url": { "type": "string", "description": "URL of the repository or website to parse" },
                "type": { "type": "string", "enum": ["repository", "website"], "description": "Type of content to parse" },
                "options": { "type": "object", "description": "Parsing options" }
            }
        })
    }

    async fn execute(
        &self,
        params: Map<String, Value>,
        client: &Context7Client,
    ) -> Result<Value, AppError> {
        if !has_fields(&params, &["url", "type"]) {
            return Err(AppError::bad_request(
                MISSING_PARAMETERS,
                "URL and type are required",
            ));
        }
        let request: ParseRepositoryRequest = decode(params)?;
        info!(kind = %request.kind, url = %request.url, "Parsing content");

        let payload = ParsePayload::from(request);
        client
            .parse(&payload)
            .await
            .map_err(|e| upstream_failure(self.name(), e, PARSE_ERROR))
    }
}

// ============ get_project_status ============

pub struct GetProjectStatus;

#[async_trait]
impl Capability for GetProjectStatus {
    fn name(&self) -> &str {
        "get_project_status"
    }

    fn description(&self) -> &str {
        "Get the status of a parsing project"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["projectId"],
            "properties": {
                "projectId": project_id_schema()
            }
        })
    }

    async fn execute(
        &self,
        params: Map<String, Value>,
        client: &Context7Client,
    ) -> Result<Value, AppError> {
        if !has_fields(&params, &["projectId"]) {
            return Err(AppError::bad_request(
                MISSING_PROJECT_ID,
                "projectId is required",
            ));
        }
        let request: ProjectStatusRequest = decode(params)?;
        info!(project_id = %request.project_id, "Getting project status");

        client
            .project_status(&request.project_id)
            .await
            .map_err(|e| upstream_failure(self.name(), e, STATUS_ERROR))
    }
}

// ============ refresh_project ============

pub struct RefreshProject;

#[async_trait]
impl Capability for RefreshProject {
    fn name(&self) -> &str {
        "refresh_project"
    }

    fn description(&self) -> &str {
        "Refresh an existing project by re-parsing"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["projectId"],
            "properties": {
                "projectId": project_id_schema(),
                "forceRebuild": { "type": "boolean", "description": "Force a complete rebuild" }
            }
        })
    }

    async fn execute(
        &self,
        params: Map<String, Value>,
        client: &Context7Client,
    ) -> Result<Value, AppError> {
        if !has_fields(&params, &["projectId"]) {
            return Err(AppError::bad_request(
                MISSING_PROJECT_ID,
                "projectId is required",
            ));
        }
        let request: RefreshProjectRequest = decode(params)?;

        let payload = RefreshPayload::from(request);
        info!(
            project_id = %payload.project_id,
            force_rebuild = payload.force_rebuild,
            "Refreshing project"
        );
        client
            .refresh(&payload)
            .await
            .map_err(|e| upstream_failure(self.name(), e, REFRESH_ERROR))
    }
}

// ============ search_context ============

pub struct SearchContext;

#[async_trait]
impl Capability for SearchContext {
    fn name(&self) -> &str {
        "search_context"
    }

    fn description(&self) -> &str {
        "Search through parsed project context using vector search"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["projectId", "query"],
            "properties": {
                "projectId": project_id_schema(),
                "query": { "type": "string", "description": "Search query for semantic code search" },
                "limit": { "type": "integer", "description": "Maximum number of results to return" }
            }
        })
    }

    async fn execute(
        &self,
        params: Map<String, Value>,
        client: &Context7Client,
    ) -> Result<Value, AppError> {
        if !has_fields(&params, &["projectId", "query"]) {
            return Err(AppError::bad_request(
                MISSING_PARAMETERS,
                "projectId and query are required",
            ));
        }
        let request: SearchContextRequest = decode(params)?;
        let limit = request.effective_limit();
        info!(
            project_id = %request.project_id,
            query = %request.query,
            limit,
            "Searching context"
        );

        client
            .search(&request.project_id, &request.query, limit)
            .await
            .map_err(|e| upstream_failure(self.name(), e, SEARCH_ERROR))
    }
}
