//! # Context7 MCP Adapter
//!
//! A thin MCP-compatible HTTP adapter in front of the Context7 API.
//!
//! Four capabilities (repository parsing, project status, project refresh
//! and context search) are validated locally and forwarded to the upstream
//! API with a bearer token. The upstream response is relayed unchanged;
//! failures come back as a uniform error envelope. Parsing, indexing and
//! search all happen upstream.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────────────────┐   ┌──────────────┐
//! │  Client  │──▶│  server (axum)           │──▶│  Context7    │
//! │ (MCP/AI) │   │  validate → forward      │   │  API (HTTPS) │
//! └──────────┘◀──│  relay / error envelope  │◀──└──────────────┘
//!                └──────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Environment and TOML configuration |
//! | [`error`] | Error envelope and handler error type |
//! | [`models`] | Request bodies, upstream payloads, metadata responses |
//! | [`client`] | Context7 HTTP client |
//! | [`traits`] | `Capability` trait and registry |
//! | [`capabilities`] | The four forwarding capabilities |
//! | [`server`] | HTTP server |
//! | [`logging`] | Tracing subscriber setup |

pub mod capabilities;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
pub mod traits;
