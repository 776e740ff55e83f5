pub mod document;
pub mod error;

pub use document::{CREATED_AT_FIELD, Document, ID_FIELD, epoch_seconds};
pub use error::{GatewayError, Result};
