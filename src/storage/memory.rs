//! In-process document store
//!
//! `MemoryConnector` keeps one server per endpoint for its whole lifetime.
//! Handles created for the same endpoint share that server, so closing a
//! handle and connecting again sees the same documents, the way a real
//! database outlives its clients.

use super::engine::{Connector, Filter, StoreClient, UpdateOutcome};
use crate::connection::ClientConfig;
use crate::core::{Document, GatewayError, ID_FIELD, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};

/// Documents of one endpoint, keyed by (database, collection)
#[derive(Default)]
struct MemoryServer {
    collections: RwLock<HashMap<(String, String), Vec<Document>>>,
}

fn namespace(database: &str, collection: &str) -> (String, String) {
    (database.to_string(), collection.to_string())
}

pub struct MemoryConnector {
    servers: Mutex<HashMap<String, Arc<MemoryServer>>>,
    connects: AtomicUsize,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self {
            servers: Mutex::new(HashMap::new()),
            connects: AtomicUsize::new(0),
        }
    }

    /// Number of client handles this connector has built
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, endpoint: &str, _config: &ClientConfig) -> Result<Arc<dyn StoreClient>> {
        let server = {
            let mut servers = self.servers.lock().await;
            Arc::clone(servers.entry(endpoint.to_string()).or_default())
        };
        self.connects.fetch_add(1, Ordering::SeqCst);

        Ok(Arc::new(MemoryClient {
            server,
            closed: AtomicBool::new(false),
        }))
    }
}

pub struct MemoryClient {
    server: Arc<MemoryServer>,
    closed: AtomicBool,
}

impl MemoryClient {
    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(GatewayError::Store("Client is closed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreClient for MemoryClient {
    async fn insert_one(&self, database: &str, collection: &str, document: Document) -> Result<()> {
        self.ensure_open()?;

        let mut collections = self.server.collections.write().await;
        collections
            .entry(namespace(database, collection))
            .or_default()
            .push(document);
        Ok(())
    }

    async fn find_one(&self, database: &str, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        self.ensure_open()?;

        let collections = self.server.collections.read().await;
        Ok(collections
            .get(&namespace(database, collection))
            .and_then(|docs| docs.iter().find(|doc| filter.matches(doc)))
            .cloned())
    }

    async fn update_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome> {
        self.ensure_open()?;

        let mut collections = self.server.collections.write().await;
        let docs = collections.entry(namespace(database, collection)).or_default();

        if let Some(existing) = docs.iter_mut().find(|doc| filter.matches(doc)) {
            let changed = existing.merge(&set);
            return Ok(UpdateOutcome {
                matched: 1,
                modified: u64::from(changed),
                upserted: false,
            });
        }

        if !upsert {
            return Ok(UpdateOutcome::default());
        }

        // Equality fields of the filter seed the new document
        let mut created = Document::new();
        if let Filter::IdEquals(id) = filter {
            created.insert(ID_FIELD, id.as_str());
        }
        created.merge(&set);
        docs.push(created);

        Ok(UpdateOutcome {
            matched: 0,
            modified: 0,
            upserted: true,
        })
    }

    async fn delete_one(&self, database: &str, collection: &str, filter: &Filter) -> Result<u64> {
        self.ensure_open()?;

        let mut collections = self.server.collections.write().await;
        let Some(docs) = collections.get_mut(&namespace(database, collection)) else {
            return Ok(0);
        };

        match docs.iter().position(|doc| filter.matches(doc)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(&self, database: &str, collection: &str, filter: &Filter) -> Result<u64> {
        self.ensure_open()?;

        let mut collections = self.server.collections.write().await;
        let Some(docs) = collections.get_mut(&namespace(database, collection)) else {
            return Ok(0);
        };

        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        Ok((before - docs.len()) as u64)
    }

    async fn shutdown(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
