use std::time::Duration;

use serde_json::Value;

use crate::data::store::{config_cache_key, ConfigStore};
use crate::data::transport::{Transport, TransportError};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::EngineEvent;

// ============================================================================
// Persisted configuration source — fetches PageConfig documents by page code
// ============================================================================

/// The remote configuration service plus a local cache.
///
/// The wire format is exactly the raw `PageConfig` document inside the
/// standard response envelope's `data` field — no extra wrapping.
pub struct ConfigSource<'a> {
    endpoint: String,
    transport: &'a dyn Transport,
    store: &'a ConfigStore,
    cache_ttl: Option<Duration>,
}

impl<'a> ConfigSource<'a> {
    pub fn new(endpoint: &str, transport: &'a dyn Transport, store: &'a ConfigStore) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            transport,
            store,
            cache_ttl: Some(Duration::from_secs(300)),
        }
    }

    pub fn cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Fetch the raw config document for a page, preferring the cache.
    pub fn fetch(
        &self,
        page_code: &str,
        logger: &TraceLogger,
    ) -> Result<Value, TransportError> {
        let key = config_cache_key(&self.endpoint, page_code);

        if let Some(cached) = self.store.get(&key) {
            logger.log(
                &EngineEvent::now("fetch")
                    .with_page(page_code)
                    .with_detail("cache hit"),
            );
            return Ok(cached);
        }

        let url = format!("{}/page/{}", self.endpoint, page_code);
        let response = self.transport.request(&url, "GET", None)?;

        self.store.put(&key, response.data.clone(), self.cache_ttl);
        logger.log(
            &EngineEvent::now("fetch")
                .with_page(page_code)
                .with_detail("fetched from service"),
        );

        Ok(response.data)
    }
}
