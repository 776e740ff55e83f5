// ============================================================================
// docgate Library
// ============================================================================

//! Thin gateway over a document store.
//!
//! Documents are open JSON objects carrying a generated `id` and a
//! `createdAt` epoch-seconds timestamp. Every operation names its target
//! collection with a [`ConnectionDescriptor`]; client handles are cached per
//! endpoint in a caller-owned [`ClientRegistry`].
//!
//! # Examples
//!
//! ```
//! use docgate::{ConnectionDescriptor, Document, DocumentGateway};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = DocumentGateway::in_memory();
//! let images = ConnectionDescriptor::new("mem://local", "files", "images")?;
//!
//! let mut data = Document::from_value(json!({"base64": "/9j/4AAQ"}))?;
//! let id = gateway.insert(&images, &mut data).await?;
//!
//! let fetched = gateway.get(&images, &id).await?;
//! assert_eq!(fetched, Some(data));
//!
//! assert!(gateway.delete(&images, &id).await?);
//! assert_eq!(gateway.purge_older_than(&images, None).await?, 0);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod connection;
pub mod facade;
pub mod storage;

// Re-export main types for convenience
pub use crate::core::{Document, GatewayError, Result, CREATED_AT_FIELD, ID_FIELD};
pub use facade::{DocumentGateway, UpsertOutcome};

// Re-export connection API
pub use connection::{
    ClientConfig,
    ClientRegistry,
    ConnectionDescriptor,
    RegistryStats,
    DEFAULT_MAX_AGE_DAYS,
};

pub use storage::{Connector, MemoryConnector, StoreClient};
#[cfg(feature = "mongo")]
pub use storage::MongoConnector;
