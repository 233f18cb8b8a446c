//! The console service: cache-aware reads and invalidating writes.
//!
//! [`ConsoleApi`] is the one object a view talks to. Reads go through
//! the session cache keyed by the canonical query; mutations validate
//! locally first, then PATCH, and only on success invalidate the
//! affected listing prefix so the caller's refetch sees fresh data. A
//! failed mutation leaves the cache, and therefore the display,
//! untouched.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::info;

use mediadeck_core::{
    Label, ListQuery, PipelineStatus, Record, RecordPage, SortOrder, is_valid_title_id,
};

use crate::cache::{CacheKey, ResponseCache};
use crate::config::ApiConfig;
use crate::error::ClientError;
use crate::http::ApiClient;

const TRAINING: &str = "training";
const PREDICTION: &str = "prediction/";
const MEDIA: &str = "media/";
const FLYWAY: &str = "flyway/";
const HEALTH: &str = "health";

/// How long record listings stay fresh.
pub const LISTING_TTL: Duration = Duration::from_secs(60);
/// Migration history changes rarely; cache it longer.
pub const MIGRATION_TTL: Duration = Duration::from_secs(300);

pub struct ConsoleApi {
    client: ApiClient,
    cache: ResponseCache,
}

impl ConsoleApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        Ok(Self {
            client: ApiClient::new(config)?,
            cache: ResponseCache::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    // ── Reads ──

    /// Training records per the given query.
    pub async fn training(&mut self, query: &ListQuery) -> Result<RecordPage, ClientError> {
        let params = query.params();
        let key = CacheKey::new(TRAINING, query.canonical_string());
        let body = self
            .cache
            .get_or_fetch(key, LISTING_TTL, || self.client.get(TRAINING, &params))
            .await?;
        Ok(RecordPage::from_response(body))
    }

    /// Count of unreviewed training movies: the review backlog.
    pub async fn unreviewed_count(&mut self) -> Result<u64, ClientError> {
        let query = ListQuery::new()
            .with_reviewed(false)
            .with_media_type("movie");
        let page = self.training(&query).await?;
        Ok(page.total.unwrap_or(page.len() as u64))
    }

    /// Prediction records per the given query.
    pub async fn predictions(&mut self, query: &ListQuery) -> Result<RecordPage, ClientError> {
        let params = query.params();
        let key = CacheKey::new(PREDICTION, query.canonical_string());
        let body = self
            .cache
            .get_or_fetch(key, LISTING_TTL, || self.client.get(PREDICTION, &params))
            .await?;
        Ok(RecordPage::from_response(body))
    }

    /// Media records. This endpoint paginates by `page`/`limit`.
    pub async fn media(&mut self, query: &ListQuery) -> Result<RecordPage, ClientError> {
        let params = query.page_params();
        let key = CacheKey::new(MEDIA, query.canonical_page_string());
        let body = self
            .cache
            .get_or_fetch(key, LISTING_TTL, || self.client.get(MEDIA, &params))
            .await?;
        Ok(RecordPage::from_response(body))
    }

    /// Migration history, optionally sorted server-side.
    pub async fn migrations(
        &mut self,
        sort_by: &str,
        sort_order: SortOrder,
    ) -> Result<RecordPage, ClientError> {
        let params = vec![
            ("sort_by", sort_by.to_string()),
            ("sort_order", sort_order.as_str().to_string()),
        ];
        let key = CacheKey::new(FLYWAY, format!("sort_by={sort_by}&sort_order={sort_order}"));
        let body = self
            .cache
            .get_or_fetch(key, MIGRATION_TTL, || self.client.get(FLYWAY, &params))
            .await?;
        Ok(RecordPage::from_response(body))
    }

    /// Liveness probe. Never cached.
    pub async fn health(&mut self) -> Result<Value, ClientError> {
        self.client.get(HEALTH, &[]).await
    }

    // ── Training mutations ──

    /// Set the label on a training record. The server also marks it
    /// reviewed and human-labeled.
    pub async fn update_label(&mut self, imdb_id: &str, label: Label) -> Result<Record, ClientError> {
        self.guard_title_id(imdb_id)?;
        let path = format!("{TRAINING}/{imdb_id}/label");
        let body = json!({ "label": label.as_str() });
        let response = self.client.patch(&path, Some(&body)).await?;
        self.cache.invalidate_prefix(TRAINING);
        info!(imdb_id, label = %label, "label updated");
        Ok(into_record(response))
    }

    /// Set the reviewed flag on a training record.
    pub async fn set_reviewed(
        &mut self,
        imdb_id: &str,
        reviewed: bool,
    ) -> Result<Record, ClientError> {
        self.guard_title_id(imdb_id)?;
        let path = format!("{TRAINING}/{imdb_id}/reviewed");
        let body = json!({ "reviewed": reviewed });
        let response = self.client.patch(&path, Some(&body)).await?;
        self.cache.invalidate_prefix(TRAINING);
        info!(imdb_id, reviewed, "reviewed flag updated");
        Ok(into_record(response))
    }

    /// Set the anomalous flag on a training record.
    pub async fn set_anomalous(
        &mut self,
        imdb_id: &str,
        anomalous: bool,
    ) -> Result<Record, ClientError> {
        self.guard_title_id(imdb_id)?;
        let path = format!("{TRAINING}/{imdb_id}/anomalous");
        let body = json!({ "anomalous": anomalous });
        let response = self.client.patch(&path, Some(&body)).await?;
        self.cache.invalidate_prefix(TRAINING);
        info!(imdb_id, anomalous, "anomalous flag updated");
        Ok(into_record(response))
    }

    // ── Media mutations ──

    /// Move a media item to a new pipeline stage.
    pub async fn set_pipeline_status(
        &mut self,
        hash_id: &str,
        status: PipelineStatus,
    ) -> Result<Record, ClientError> {
        let path = format!("{MEDIA}{hash_id}/pipeline");
        let body = json!({ "pipeline_status": status.as_str() });
        let response = self.client.patch(&path, Some(&body)).await?;
        self.cache.invalidate_prefix("media");
        info!(hash_id, status = %status, "pipeline status updated");
        Ok(into_record(response))
    }

    /// Clear errors on a media item and put it back on the download path.
    pub async fn promote(&mut self, hash_id: &str) -> Result<Record, ClientError> {
        self.media_action(hash_id, "promote").await
    }

    /// Mark a media item complete and release its transfer.
    pub async fn finish(&mut self, hash_id: &str) -> Result<Record, ClientError> {
        self.media_action(hash_id, "finish").await
    }

    /// Soft-delete a media item.
    pub async fn soft_delete(&mut self, hash_id: &str) -> Result<Record, ClientError> {
        self.media_action(hash_id, "soft_delete").await
    }

    async fn media_action(&mut self, hash_id: &str, action: &str) -> Result<Record, ClientError> {
        let path = format!("{MEDIA}{hash_id}/{action}");
        let response = self.client.patch(&path, None).await?;
        self.cache.invalidate_prefix("media");
        info!(hash_id, action, "media action applied");
        Ok(into_record(response))
    }

    fn guard_title_id(&self, imdb_id: &str) -> Result<(), ClientError> {
        if is_valid_title_id(imdb_id) {
            Ok(())
        } else {
            Err(ClientError::InvalidTitleId(imdb_id.to_string()))
        }
    }
}

fn into_record(response: Value) -> Record {
    Record::from_value(response).unwrap_or_else(|| Record::new(serde_json::Map::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::config::{ENV_HOST, ENV_PORT, ENV_TIMEOUT};

    fn refused_api() -> ConsoleApi {
        // Nothing listens on loopback port 1; every request fails fast.
        let config = ApiConfig::from_lookup(|var| match var {
            ENV_HOST => Some("127.0.0.1".to_string()),
            ENV_PORT => Some("1".to_string()),
            ENV_TIMEOUT => Some("2".to_string()),
            _ => None,
        })
        .unwrap();
        ConsoleApi::new(&config).unwrap()
    }

    #[tokio::test]
    async fn invalid_title_id_blocks_the_call() {
        let mut api = refused_api();
        for bad in ["tt123", "tt123456789", "abc1234567", ""] {
            let err = api.update_label(bad, Label::WouldWatch).await.unwrap_err();
            assert!(
                matches!(err, ClientError::InvalidTitleId(_)),
                "{bad:?} got {err:?}"
            );
        }
        let err = api.set_reviewed("tt12", true).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidTitleId(_)));
        let err = api.set_anomalous("nope", true).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidTitleId(_)));
    }

    #[tokio::test]
    async fn valid_title_id_reaches_the_network() {
        let mut api = refused_api();
        // With a well-formed identifier the guard passes and the failure
        // is the (refused) connection, not validation.
        let err = api.update_label("tt1234567", Label::WouldWatch).await.unwrap_err();
        assert!(matches!(err, ClientError::Connect(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn failed_mutation_leaves_cache_untouched() {
        let mut api = refused_api();
        api.cache
            .get_or_fetch(
                CacheKey::new("media/", "page=1&limit=25"),
                LISTING_TTL,
                || async { Ok(json!({"data": [{"hash": "abc"}]})) },
            )
            .await
            .unwrap();
        assert_eq!(api.cache.len(), 1);

        let err = api
            .set_pipeline_status("abc", PipelineStatus::Complete)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Connect(_)));
        assert_eq!(api.cache.len(), 1, "cache must survive a failed PATCH");
    }

    #[tokio::test]
    async fn blocked_mutation_leaves_cache_untouched() {
        let mut api = refused_api();
        api.cache
            .get_or_fetch(CacheKey::new("training", "limit=25"), LISTING_TTL, || async {
                Ok(json!({"data": []}))
            })
            .await
            .unwrap();

        let err = api.update_label("tt123", Label::WouldWatch).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidTitleId(_)));
        assert_eq!(api.cache.len(), 1);
    }
}
