use crate::core::{GatewayError, Result};
use serde::{Deserialize, Serialize};

/// Names the physical collection an operation targets
///
/// All three fields are required and must be non-empty. The value is
/// immutable once built; use [`ConnectionDescriptor::with_collection`] to
/// address a sibling collection on the same database.
///
/// # Examples
///
/// ```
/// use docgate::ConnectionDescriptor;
///
/// let images = ConnectionDescriptor::new("mongodb://localhost:27017", "files", "images")?;
/// let thumbs = images.with_collection("thumbnails")?;
/// assert_eq!(thumbs.database_name(), "files");
/// # Ok::<(), docgate::GatewayError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct ConnectionDescriptor {
    endpoint: String,
    database_name: String,
    collection_name: String,
}

#[derive(Deserialize)]
struct RawDescriptor {
    endpoint: String,
    database_name: String,
    collection_name: String,
}

impl TryFrom<RawDescriptor> for ConnectionDescriptor {
    type Error = GatewayError;

    fn try_from(raw: RawDescriptor) -> Result<Self> {
        Self::new(raw.endpoint, raw.database_name, raw.collection_name)
    }
}

impl ConnectionDescriptor {
    pub fn new(
        endpoint: impl Into<String>,
        database_name: impl Into<String>,
        collection_name: impl Into<String>,
    ) -> Result<Self> {
        let descriptor = Self {
            endpoint: endpoint.into(),
            database_name: database_name.into(),
            collection_name: collection_name.into(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Parse and validate a descriptor from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Same endpoint and database, different collection
    pub fn with_collection(&self, collection_name: impl Into<String>) -> Result<Self> {
        Self::new(
            self.endpoint.clone(),
            self.database_name.clone(),
            collection_name,
        )
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("endpoint", &self.endpoint),
            ("database_name", &self.database_name),
            ("collection_name", &self.collection_name),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(GatewayError::InvalidDescriptor(format!(
                    "{} cannot be empty",
                    name
                )));
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The endpoint may embed credentials, so it is left out.
        write!(f, "{}.{}", self.database_name, self.collection_name)
    }
}
