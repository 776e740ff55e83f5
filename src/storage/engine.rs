use crate::connection::ClientConfig;
use crate::core::{Document, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Field filters understood by every backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `id` equals the given string
    IdEquals(String),
    /// Numeric `createdAt` is less than or equal to the given epoch seconds.
    /// Documents without a numeric `createdAt` never match.
    CreatedAtAtMost(i64),
}

impl Filter {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::IdEquals(id) => doc.id() == Some(id.as_str()),
            Filter::CreatedAtAtMost(cutoff) => doc
                .created_at()
                .is_some_and(|created_at| created_at <= *cutoff as f64),
        }
    }
}

/// Result of a single-document update as reported by the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
    pub upserted: bool,
}

/// A live client handle to one store endpoint
///
/// Every call names the database and collection it targets; the handle
/// itself is shared by all of them.
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn insert_one(&self, database: &str, collection: &str, document: Document) -> Result<()>;

    async fn find_one(&self, database: &str, collection: &str, filter: &Filter) -> Result<Option<Document>>;

    /// Apply `set` as a field-level merge to the first match. With `upsert`,
    /// a missing document is created from the filter's equality fields plus `set`.
    async fn update_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome>;

    async fn delete_one(&self, database: &str, collection: &str, filter: &Filter) -> Result<u64>;

    async fn delete_many(&self, database: &str, collection: &str, filter: &Filter) -> Result<u64>;

    /// Release the handle's resources. Further calls on this handle fail.
    async fn shutdown(&self) -> Result<()>;
}

/// Builds client handles for an endpoint - allows pluggable storage backends
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &str, config: &ClientConfig) -> Result<Arc<dyn StoreClient>>;
}
