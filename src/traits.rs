//! Capability trait and registry.
//!
//! Every forwarding operation the adapter exposes is a [`Capability`]. The
//! [`CapabilityRegistry`] is the single source of truth for both routing
//! (`POST /mcp/context7-parser/{name}`) and discovery
//! (`GET /.well-known/mcp-server`), so the manifest can never list an
//! operation the server does not serve.
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │            CapabilityRegistry             │
//! │  parse_repository   get_project_status    │
//! │  refresh_project    search_context        │
//! └──────────────┬─────────────────┬──────────┘
//!                ▼                 ▼
//!        POST /mcp/…/{name}   GET /.well-known/mcp-server
//! ```

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::capabilities::{GetProjectStatus, ParseRepository, RefreshProject, SearchContext};
use crate::client::Context7Client;
use crate::error::AppError;
use crate::models::{CapabilityInfo, ServerManifest, MANIFEST_NAME, MANIFEST_VERSION};

/// One operation forwarded to the upstream API.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Route segment and manifest name, e.g. `"search_context"`.
    fn name(&self) -> &str;

    /// One-line description for the discovery manifest.
    fn description(&self) -> &str;

    /// JSON-schema-like description of the request body.
    ///
    /// Must list every field the capability rejects as missing under
    /// `"required"`.
    fn input_schema(&self) -> Value;

    /// Validate `params` and forward them upstream.
    ///
    /// `params` is the request body, already known to be a JSON object.
    /// On success the upstream body is returned unmodified.
    async fn execute(
        &self,
        params: Map<String, Value>,
        client: &Context7Client,
    ) -> Result<Value, AppError>;

    fn info(&self) -> CapabilityInfo {
        CapabilityInfo {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

pub struct CapabilityRegistry {
    capabilities: Vec<Box<dyn Capability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self {
            capabilities: Vec::new(),
        }
    }

    /// Registry holding the four Context7 capabilities.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ParseRepository));
        registry.register(Box::new(GetProjectStatus));
        registry.register(Box::new(RefreshProject));
        registry.register(Box::new(SearchContext));
        registry
    }

    pub fn register(&mut self, capability: Box<dyn Capability>) {
        self.capabilities.push(capability);
    }

    pub fn capabilities(&self) -> &[Box<dyn Capability>] {
        &self.capabilities
    }

    pub fn find(&self, name: &str) -> Option<&dyn Capability> {
        self.capabilities
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    /// Discovery manifest in registration order.
    pub fn manifest(&self) -> ServerManifest {
        ServerManifest {
            name: MANIFEST_NAME.to_string(),
            version: MANIFEST_VERSION.to_string(),
            capabilities: self.capabilities.iter().map(|c| c.info()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
