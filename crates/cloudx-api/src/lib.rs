//! Container backend trait and REST client for cloudx
//!
//! The backend is the source of truth for container inventory. This crate
//! defines the three calls the client makes against it and an HTTP
//! implementation speaking the `/api/containers` JSON envelope protocol.

mod error;
mod http;
mod types;

pub use error::*;
pub use http::HttpBackend;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Trait for container backends
#[async_trait]
pub trait ContainerBackend: Send + Sync {
    /// List the current inventory, in backend order
    async fn list(&self) -> Result<Vec<ContainerRecord>>;

    /// Apply a lifecycle action to one container
    async fn action(&self, request: &LifecycleRequest) -> Result<()>;

    /// Fetch the log text of one container. `None` when the backend sent no content.
    async fn logs(&self, container_id: &str) -> Result<Option<String>>;

    /// Human-readable description of where this backend points
    fn endpoint(&self) -> String;
}

/// Create the backend described by the global config
pub fn create_backend(config: &cloudx_config::GlobalConfig) -> Result<Arc<dyn ContainerBackend>> {
    let backend = HttpBackend::new(&config.backend.url, config.request_timeout())?;
    tracing::debug!("Using container backend at {}", backend.endpoint());
    Ok(Arc::new(backend))
}
