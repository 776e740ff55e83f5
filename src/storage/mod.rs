pub mod engine;
pub mod memory;
#[cfg(feature = "mongo")]
pub mod mongo;

pub use engine::{Connector, Filter, StoreClient, UpdateOutcome};
pub use memory::MemoryConnector;
#[cfg(feature = "mongo")]
pub use mongo::MongoConnector;
