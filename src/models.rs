//! Request and response shapes.
//!
//! Inbound bodies are checked in two steps: first for the presence of the
//! required fields on the raw JSON object ([`has_fields`]), then decoded
//! into a typed request ([`decode`]). Missing fields therefore always
//! surface as the documented `MISSING_*` code, and only complete bodies
//! can fail with `INVALID_PARAMETERS`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{AppError, INVALID_PARAMETERS};

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Name reported by the health probe.
pub const SERVICE_NAME: &str = "context7-mcp-adapter";

/// Server name and version advertised by the discovery manifest.
pub const MANIFEST_NAME: &str = "context7-parser";
pub const MANIFEST_VERSION: &str = "1.0.0";

/// Kind of content the upstream should parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Repository,
    Website,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Repository => f.write_str("repository"),
            ContentType::Website => f.write_str("website"),
        }
    }
}

// ============ Inbound requests ============

#[derive(Debug, Clone, Deserialize)]
pub struct ParseRepositoryRequest {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    #[serde(default)]
    pub options: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatusRequest {
    pub project_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshProjectRequest {
    pub project_id: String,
    #[serde(default)]
    pub force_rebuild: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchContextRequest {
    pub project_id: String,
    pub query: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl SearchContextRequest {
    /// Result limit to forward; absent or zero falls back to the default.
    pub fn effective_limit(&self) -> u32 {
        match self.limit {
            Some(limit) if limit > 0 => limit,
            _ => DEFAULT_SEARCH_LIMIT,
        }
    }
}

// ============ Upstream payloads ============

/// Body of `POST /api/parse`.
#[derive(Debug, Clone, Serialize)]
pub struct ParsePayload {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub options: Map<String, Value>,
}

impl From<ParseRepositoryRequest> for ParsePayload {
    fn from(req: ParseRepositoryRequest) -> Self {
        Self {
            url: req.url,
            kind: req.kind,
            options: req.options.unwrap_or_default(),
        }
    }
}

/// Body of `POST /api/refresh`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshPayload {
    pub project_id: String,
    pub force_rebuild: bool,
}

impl From<RefreshProjectRequest> for RefreshPayload {
    fn from(req: RefreshProjectRequest) -> Self {
        Self {
            project_id: req.project_id,
            force_rebuild: req.force_rebuild.unwrap_or(false),
        }
    }
}

// ============ Metadata responses ============

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
}

/// Response of `GET /.well-known/mcp-server`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerManifest {
    pub name: String,
    pub version: String,
    pub capabilities: Vec<CapabilityInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityInfo {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

// ============ Validation helpers ============

/// True when every field in `fields` is present, non-null and, for
/// strings, non-empty.
pub fn has_fields(params: &Map<String, Value>, fields: &[&str]) -> bool {
    fields.iter().all(|field| match params.get(*field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    })
}

/// Decode a request object into its typed form.
pub fn decode<T: DeserializeOwned>(params: Map<String, Value>) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(params))
        .map_err(|e| AppError::bad_request(INVALID_PARAMETERS, format!("invalid parameters: {}", e)))
}
