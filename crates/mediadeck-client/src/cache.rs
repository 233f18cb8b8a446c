//! Session-scoped TTL cache for GET responses.
//!
//! Keys are `(endpoint, canonical query string)`, the same canonical
//! rendering used for the outgoing request, so two views asking the same
//! question share one entry. The cache lives and dies with one session;
//! there is no cross-session sharing and no locking.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;

/// Cache key: endpoint path plus the canonical query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    endpoint: String,
    query: String,
}

impl CacheKey {
    pub fn new(endpoint: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            query: query.into(),
        }
    }

    /// Key for an endpoint called without parameters.
    pub fn bare(endpoint: impl Into<String>) -> Self {
        Self::new(endpoint, "")
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

struct CachedEntry {
    stored_at: Instant,
    value: Value,
}

/// Memoised GET responses for one session.
#[derive(Default)]
pub struct ResponseCache {
    entries: HashMap<CacheKey, CachedEntry>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key` if it is younger than `ttl`,
    /// otherwise await `fetch`, store its result, and return it.
    ///
    /// A failed fetch stores nothing; the next call fetches again.
    pub async fn get_or_fetch<F, Fut>(
        &mut self,
        key: CacheKey,
        ttl: Duration,
        fetch: F,
    ) -> Result<Value, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ClientError>>,
    {
        if let Some(entry) = self.entries.get(&key)
            && entry.stored_at.elapsed() < ttl
        {
            debug!(endpoint = %key.endpoint, "cache hit");
            return Ok(entry.value.clone());
        }
        debug!(endpoint = %key.endpoint, "cache miss");
        let value = fetch().await?;
        self.entries.insert(
            key,
            CachedEntry {
                stored_at: Instant::now(),
                value: value.clone(),
            },
        );
        Ok(value)
    }

    /// Drop every entry whose endpoint starts with `endpoint_prefix`.
    /// Called after a successful mutation so the next read refetches.
    /// Returns the number of entries dropped.
    pub fn invalidate_prefix(&mut self, endpoint_prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|key, _| !key.endpoint.starts_with(endpoint_prefix));
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!(prefix = endpoint_prefix, dropped, "cache invalidated");
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
