use super::config::ClientConfig;
use crate::core::{GatewayError, Result};
use crate::storage::{Connector, StoreClient};
use log::{info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, OnceCell};

type HandleCell = Arc<OnceCell<Arc<dyn StoreClient>>>;

/// Client handle registry
///
/// Owns one lazily created client handle per endpoint. Build it once at
/// startup and share it by `Arc`; nothing here is process-global.
///
/// The first caller for an endpoint creates the handle while concurrent
/// callers for the same endpoint wait on the same initialization, so exactly
/// one handle is built. A failed connect removes the slot and the next
/// call tries again.
pub struct ClientRegistry {
    connector: Arc<dyn Connector>,
    config: ClientConfig,
    clients: Mutex<HashMap<String, HandleCell>>,
    handles_created: AtomicUsize,
}

impl ClientRegistry {
    /// Create a registry, validating the configuration
    pub fn new(connector: Arc<dyn Connector>, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(connector, config))
    }

    /// Create a registry with the default configuration
    pub fn with_defaults(connector: Arc<dyn Connector>) -> Self {
        Self::build(connector, ClientConfig::default())
    }

    fn build(connector: Arc<dyn Connector>, config: ClientConfig) -> Self {
        Self {
            connector,
            config,
            clients: Mutex::new(HashMap::new()),
            handles_created: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the handle for `endpoint`, creating it on first use
    pub async fn client(&self, endpoint: &str) -> Result<Arc<dyn StoreClient>> {
        let cell = {
            let mut clients = self.clients.lock().await;
            Arc::clone(clients.entry(endpoint.to_string()).or_default())
        };

        let initialized = cell
            .get_or_try_init(|| async {
                let client = self.connector.connect(endpoint, &self.config).await?;
                let created = self.handles_created.fetch_add(1, Ordering::SeqCst) + 1;
                info!("Created client handle #{}", created);
                Ok::<_, GatewayError>(client)
            })
            .await;

        match initialized {
            Ok(client) => Ok(Arc::clone(client)),
            Err(e) => {
                self.forget_empty(endpoint, &cell).await;
                Err(e)
            }
        }
    }

    /// Drop the slot for `endpoint` if it is still `cell` and was never filled
    async fn forget_empty(&self, endpoint: &str, cell: &HandleCell) {
        let mut clients = self.clients.lock().await;
        let stale = clients
            .get(endpoint)
            .is_some_and(|current| Arc::ptr_eq(current, cell) && !current.initialized());
        if stale {
            clients.remove(endpoint);
        }
    }

    /// Drop and shut down the cached handle for `endpoint`.
    ///
    /// Returns false if no handle was cached. The next `client` call for the
    /// endpoint builds a fresh handle.
    pub async fn close(&self, endpoint: &str) -> Result<bool> {
        let cell = self.clients.lock().await.remove(endpoint);

        match cell.as_ref().and_then(|cell| cell.get()) {
            Some(client) => {
                client.shutdown().await.inspect_err(|e| {
                    warn!("Client handle shutdown failed: {}", e);
                })?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Shut down every cached handle. All handles are attempted; the first
    /// failure is returned.
    pub async fn close_all(&self) -> Result<usize> {
        let cells: Vec<HandleCell> = self.clients.lock().await.drain().map(|(_, cell)| cell).collect();

        let mut closed = 0;
        let mut first_error = None;
        for cell in cells {
            let Some(client) = cell.get() else { continue };
            match client.shutdown().await {
                Ok(()) => closed += 1,
                Err(e) => {
                    warn!("Client handle shutdown failed: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(closed),
        }
    }

    /// Get registry statistics
    pub async fn stats(&self) -> RegistryStats {
        let clients = self.clients.lock().await;

        RegistryStats {
            cached_handles: clients.values().filter(|cell| cell.initialized()).count(),
            handles_created: self.handles_created.load(Ordering::SeqCst),
        }
    }
}

/// Registry statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub cached_handles: usize,
    pub handles_created: usize,
}

impl std::fmt::Display for RegistryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Registry Stats: {} cached, {} created",
            self.cached_handles, self.handles_created
        )
    }
}
