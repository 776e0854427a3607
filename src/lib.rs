//! Wikitext document service.
//!
//! A thin HTTP shell around the `parse_wiki_text` grammar:
//! - `config`: CLI-derived server configuration
//! - `transform`: wikitext to sectioned plain-text documents
//! - `service`: axum router, handlers and error mapping
//!
//! Requests carry raw wikitext as JSON; responses carry either a sectioned
//! document or flat plain text, selected per instance. Scale out by running
//! more instances on other ports behind a load balancer.

pub mod config;
pub mod service;
pub mod transform;

// Re-export commonly used types
pub use config::{ResponseShape, ServerConfig};
pub use service::{create_router, AppState};
pub use transform::{DocumentSection, ParsedDocument, TransformError, WikitextTransformer};
