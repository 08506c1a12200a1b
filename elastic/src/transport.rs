//! Seam to the engine. No concrete network client lives in this crate.

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// JSON request/response channel to a search engine.
///
/// Implementations own connection handling, retries and timeouts; the core
/// only hands over rendered documents and decodes whatever comes back.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Create or update the mapping of `index`.
    async fn put_mapping(&self, index: &str, mapping: Value) -> Result<Value>;

    /// Run a search request against `index` and return the raw response.
    async fn search(&self, index: &str, body: Value) -> Result<Value>;
}
