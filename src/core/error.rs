use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid connection descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Connection to '{endpoint}' failed: {message}")]
    Connection { endpoint: String, message: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Upsert of '{id}' in '{collection}' neither matched nor created a document")]
    UpsertAnomaly { collection: String, id: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
