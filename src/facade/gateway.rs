//! Document Store Gateway
//!
//! The six document operations. Every call names its target collection with
//! a [`ConnectionDescriptor`]; the client handle for the descriptor's endpoint
//! comes from the shared [`ClientRegistry`].

use crate::connection::{ClientRegistry, ConnectionDescriptor};
use crate::core::{Document, GatewayError, ID_FIELD, Result, epoch_seconds};
use crate::storage::{Connector, Filter, MemoryConnector, StoreClient};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// What an upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// An existing document was matched and merged into
    Matched,
    /// No document had the id, so one was created
    Created,
}

impl UpsertOutcome {
    /// True in both cases: the document now exists with the given fields
    pub fn applied(&self) -> bool {
        matches!(self, UpsertOutcome::Matched | UpsertOutcome::Created)
    }
}

/// Cutoff for an age-based purge, truncated to whole epoch seconds.
///
/// An age reaching past the representable calendar saturates to `i64::MIN`,
/// which no document is old enough to match.
pub fn purge_cutoff(now: DateTime<Utc>, max_age_days: u32) -> i64 {
    Duration::try_days(i64::from(max_age_days))
        .and_then(|age| now.checked_sub_signed(age))
        .map_or(i64::MIN, |cutoff| cutoff.timestamp())
}

#[derive(Clone)]
pub struct DocumentGateway {
    registry: Arc<ClientRegistry>,
}

impl DocumentGateway {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    /// Gateway over a fresh in-process store with default configuration
    pub fn in_memory() -> Self {
        Self::with_connector(Arc::new(MemoryConnector::new()))
    }

    /// Gateway over any connector with default configuration
    pub fn with_connector(connector: Arc<dyn Connector>) -> Self {
        Self::new(Arc::new(ClientRegistry::with_defaults(connector)))
    }

    /// Gateway over MongoDB
    #[cfg(feature = "mongo")]
    pub fn mongo(config: crate::connection::ClientConfig) -> Result<Self> {
        let connector = Arc::new(crate::storage::MongoConnector::new());
        Ok(Self::new(Arc::new(ClientRegistry::new(connector, config)?)))
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    async fn client_for(&self, target: &ConnectionDescriptor) -> Result<Arc<dyn StoreClient>> {
        self.registry.client(target.endpoint()).await
    }

    /// Insert `data` as a new document and return its id.
    ///
    /// A fresh UUID is written into `data.id` (replacing any caller value) and
    /// `data.createdAt` is set to now unless already present. The caller's
    /// document is modified in place.
    pub async fn insert(&self, target: &ConnectionDescriptor, data: &mut Document) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        data.assign_identity(&id, epoch_seconds(Utc::now()));

        let client = self.client_for(target).await?;
        client
            .insert_one(target.database_name(), target.collection_name(), data.clone())
            .await?;

        debug!(collection = %target, id = %id, "inserted document");
        Ok(id)
    }

    /// Merge `data` into the document with `doc_id`, creating it if missing.
    ///
    /// A created document holds exactly `data` plus `id`; it gets no
    /// `createdAt`. An `id` key inside `data` is ignored.
    pub async fn upsert(
        &self,
        target: &ConnectionDescriptor,
        doc_id: &str,
        data: &Document,
    ) -> Result<UpsertOutcome> {
        let mut set = data.without_id();
        set.insert(ID_FIELD, doc_id);

        let client = self.client_for(target).await?;
        let outcome = client
            .update_one(
                target.database_name(),
                target.collection_name(),
                &Filter::IdEquals(doc_id.to_string()),
                set,
                true,
            )
            .await?;

        let result = if outcome.upserted {
            UpsertOutcome::Created
        } else if outcome.matched > 0 {
            UpsertOutcome::Matched
        } else {
            return Err(GatewayError::UpsertAnomaly {
                collection: target.to_string(),
                id: doc_id.to_string(),
            });
        };

        debug!(collection = %target, id = doc_id, outcome = ?result, "upserted document");
        Ok(result)
    }

    /// Fetch the document with `doc_id`, or `None`
    pub async fn get(&self, target: &ConnectionDescriptor, doc_id: &str) -> Result<Option<Document>> {
        let client = self.client_for(target).await?;
        client
            .find_one(
                target.database_name(),
                target.collection_name(),
                &Filter::IdEquals(doc_id.to_string()),
            )
            .await
    }

    /// Merge `fields` into an existing document. True only if some field
    /// actually changed; never creates a document.
    pub async fn update(&self, target: &ConnectionDescriptor, doc_id: &str, fields: &Document) -> Result<bool> {
        let set = fields.without_id();
        if set.is_empty() {
            return Ok(false);
        }

        let client = self.client_for(target).await?;
        let outcome = client
            .update_one(
                target.database_name(),
                target.collection_name(),
                &Filter::IdEquals(doc_id.to_string()),
                set,
                false,
            )
            .await?;

        debug!(
            collection = %target,
            id = doc_id,
            matched = outcome.matched,
            modified = outcome.modified,
            "updated document"
        );
        Ok(outcome.modified > 0)
    }

    /// Remove the document with `doc_id`. True iff one was removed.
    pub async fn delete(&self, target: &ConnectionDescriptor, doc_id: &str) -> Result<bool> {
        let client = self.client_for(target).await?;
        let removed = client
            .delete_one(
                target.database_name(),
                target.collection_name(),
                &Filter::IdEquals(doc_id.to_string()),
            )
            .await?;

        debug!(collection = %target, id = doc_id, removed, "deleted document");
        Ok(removed > 0)
    }

    /// Remove every document whose `createdAt` is at or before now minus
    /// `max_age_days` (the configured default when `None`). Documents without
    /// a numeric `createdAt` are kept. Returns the number removed.
    pub async fn purge_older_than(&self, target: &ConnectionDescriptor, max_age_days: Option<u32>) -> Result<u64> {
        let days = max_age_days.unwrap_or(self.registry.config().default_max_age_days);
        let cutoff = purge_cutoff(Utc::now(), days);
        self.purge_created_at_or_before(target, cutoff).await
    }

    /// Remove every document whose numeric `createdAt` is <= `cutoff` epoch seconds
    pub async fn purge_created_at_or_before(&self, target: &ConnectionDescriptor, cutoff: i64) -> Result<u64> {
        let client = self.client_for(target).await?;
        let removed = client
            .delete_many(
                target.database_name(),
                target.collection_name(),
                &Filter::CreatedAtAtMost(cutoff),
            )
            .await?;

        info!(collection = %target, cutoff, removed, "purged documents");
        Ok(removed)
    }

    /// Shut down the cached handle for `endpoint`; the next operation on it reconnects
    pub async fn close(&self, endpoint: &str) -> Result<bool> {
        self.registry.close(endpoint).await
    }

    pub async fn close_all(&self) -> Result<usize> {
        self.registry.close_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UpdateOutcome;
    use async_trait::async_trait;
    use serde_json::json;

    fn target() -> ConnectionDescriptor {
        ConnectionDescriptor::new("mem://local", "app", "images").unwrap()
    }

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_purge_cutoff() {
        let now = DateTime::from_timestamp(1_000_000, 900_000_000).unwrap();
        assert_eq!(purge_cutoff(now, 1), 1_000_000 - 86_400);
        assert_eq!(purge_cutoff(now, 0), 1_000_000);
    }

    #[test]
    fn test_purge_cutoff_saturates_for_huge_age() {
        assert_eq!(purge_cutoff(Utc::now(), u32::MAX), i64::MIN);
    }

    #[tokio::test]
    async fn test_purge_with_huge_age_removes_nothing() {
        let gateway = DocumentGateway::in_memory();
        let id = gateway
            .insert(&target(), &mut doc(json!({"createdAt": i64::MIN / 2})))
            .await
            .unwrap();

        let removed = gateway.purge_older_than(&target(), Some(u32::MAX)).await.unwrap();

        assert_eq!(removed, 0);
        assert!(gateway.get(&target(), &id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_insert_mutates_caller_document() {
        let gateway = DocumentGateway::in_memory();
        let mut data = doc(json!({"base64": "abc"}));

        let id = gateway.insert(&target(), &mut data).await.unwrap();

        assert_eq!(data.id(), Some(id.as_str()));
        assert!(data.created_at().is_some());
    }

    #[tokio::test]
    async fn test_upsert_ignores_id_in_fields() {
        let gateway = DocumentGateway::in_memory();

        gateway
            .upsert(&target(), "doc-1", &doc(json!({"id": "other", "v": 1})))
            .await
            .unwrap();

        let fetched = gateway.get(&target(), "doc-1").await.unwrap().unwrap();
        assert_eq!(fetched, doc(json!({"id": "doc-1", "v": 1})));
        assert!(gateway.get(&target(), "other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_with_only_id_is_noop() {
        let gateway = DocumentGateway::in_memory();
        let id = gateway.insert(&target(), &mut doc(json!({"v": 1}))).await.unwrap();

        let changed = gateway
            .update(&target(), &id, &doc(json!({"id": "renamed"})))
            .await
            .unwrap();

        assert!(!changed);
        assert!(gateway.get(&target(), &id).await.unwrap().is_some());
    }

    /// Store that reports neither a match nor an upsert
    struct SilentStore;

    #[async_trait]
    impl StoreClient for SilentStore {
        async fn insert_one(&self, _: &str, _: &str, _: Document) -> Result<()> {
            Ok(())
        }
        async fn find_one(&self, _: &str, _: &str, _: &Filter) -> Result<Option<Document>> {
            Ok(None)
        }
        async fn update_one(&self, _: &str, _: &str, _: &Filter, _: Document, _: bool) -> Result<UpdateOutcome> {
            Ok(UpdateOutcome::default())
        }
        async fn delete_one(&self, _: &str, _: &str, _: &Filter) -> Result<u64> {
            Ok(0)
        }
        async fn delete_many(&self, _: &str, _: &str, _: &Filter) -> Result<u64> {
            Ok(0)
        }
        async fn shutdown(&self) -> Result<()> {
            Ok(())
        }
    }

    struct SilentConnector;

    #[async_trait]
    impl Connector for SilentConnector {
        async fn connect(&self, _: &str, _: &crate::connection::ClientConfig) -> Result<Arc<dyn StoreClient>> {
            Ok(Arc::new(SilentStore))
        }
    }

    #[tokio::test]
    async fn test_upsert_anomaly_is_surfaced() {
        let gateway = DocumentGateway::with_connector(Arc::new(SilentConnector));

        let result = gateway.upsert(&target(), "doc-1", &doc(json!({"v": 1}))).await;

        match result {
            Err(GatewayError::UpsertAnomaly { collection, id }) => {
                assert_eq!(collection, "app.images");
                assert_eq!(id, "doc-1");
            }
            other => panic!("expected upsert anomaly, got {:?}", other),
        }
    }
}
