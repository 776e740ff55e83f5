//! MongoDB backend
//!
//! Filters become BSON queries (`{"id": ..}`, `{"createdAt": {"$lte": ..}}`)
//! and updates become `$set` documents. The driver's own `_id` is stripped
//! from everything read back.

use super::engine::{Connector, Filter, StoreClient, UpdateOutcome};
use crate::connection::ClientConfig;
use crate::core::{Document, GatewayError, Result};
use async_trait::async_trait;
use mongodb::bson::{self, Bson, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use std::sync::Arc;

const MONGO_ID_FIELD: &str = "_id";

fn store_error(err: mongodb::error::Error) -> GatewayError {
    GatewayError::Store(err.to_string())
}

fn to_bson(document: &Document) -> Result<bson::Document> {
    bson::to_document(document.as_map())
        .map_err(|e| GatewayError::InvalidDocument(e.to_string()))
}

fn from_bson(mut raw: bson::Document) -> Result<Document> {
    raw.remove(MONGO_ID_FIELD);
    Document::from_value(Bson::Document(raw).into_relaxed_extjson())
}

fn filter_to_bson(filter: &Filter) -> bson::Document {
    match filter {
        Filter::IdEquals(id) => doc! { "id": id.as_str() },
        Filter::CreatedAtAtMost(cutoff) => doc! { "createdAt": { "$lte": *cutoff } },
    }
}

#[derive(Debug, Default)]
pub struct MongoConnector;

impl MongoConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for MongoConnector {
    async fn connect(&self, endpoint: &str, config: &ClientConfig) -> Result<Arc<dyn StoreClient>> {
        let connection_error = |err: mongodb::error::Error| GatewayError::Connection {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        };

        let mut options = ClientOptions::parse(endpoint).await.map_err(connection_error)?;
        options.connect_timeout = Some(config.connect_timeout);
        options.max_pool_size = Some(config.max_pool_size);
        if let Some(app_name) = &config.app_name {
            options.app_name = Some(app_name.clone());
        }

        let client = Client::with_options(options).map_err(connection_error)?;
        Ok(Arc::new(MongoClient { client }))
    }
}

pub struct MongoClient {
    client: Client,
}

impl MongoClient {
    fn collection(&self, database: &str, collection: &str) -> Collection<bson::Document> {
        self.client.database(database).collection(collection)
    }
}

#[async_trait]
impl StoreClient for MongoClient {
    async fn insert_one(&self, database: &str, collection: &str, document: Document) -> Result<()> {
        let raw = to_bson(&document)?;
        self.collection(database, collection)
            .insert_one(raw)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn find_one(&self, database: &str, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let found = self
            .collection(database, collection)
            .find_one(filter_to_bson(filter))
            .await
            .map_err(store_error)?;

        found.map(from_bson).transpose()
    }

    async fn update_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome> {
        let update = doc! { "$set": to_bson(&set)? };
        let result = self
            .collection(database, collection)
            .update_one(filter_to_bson(filter), update)
            .upsert(upsert)
            .await
            .map_err(store_error)?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
            upserted: result.upserted_id.is_some(),
        })
    }

    async fn delete_one(&self, database: &str, collection: &str, filter: &Filter) -> Result<u64> {
        let result = self
            .collection(database, collection)
            .delete_one(filter_to_bson(filter))
            .await
            .map_err(store_error)?;
        Ok(result.deleted_count)
    }

    async fn delete_many(&self, database: &str, collection: &str, filter: &Filter) -> Result<u64> {
        let result = self
            .collection(database, collection)
            .delete_many(filter_to_bson(filter))
            .await
            .map_err(store_error)?;
        Ok(result.deleted_count)
    }

    async fn shutdown(&self) -> Result<()> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_translation() {
        assert_eq!(
            filter_to_bson(&Filter::IdEquals("abc".into())),
            doc! { "id": "abc" }
        );
        assert_eq!(
            filter_to_bson(&Filter::CreatedAtAtMost(42)),
            doc! { "createdAt": { "$lte": 42_i64 } }
        );
    }

    #[test]
    fn test_from_bson_strips_driver_id() {
        let raw = doc! { "_id": bson::oid::ObjectId::new(), "id": "abc", "createdAt": 1.5 };
        let document = from_bson(raw).unwrap();

        assert_eq!(document, Document::from_value(json!({"id": "abc", "createdAt": 1.5})).unwrap());
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_uri() {
        let result = MongoConnector::new()
            .connect("not-a-uri", &ClientConfig::default())
            .await;
        assert!(matches!(result, Err(GatewayError::Connection { .. })));
    }
}
