pub mod config;
pub mod descriptor;
pub mod registry;

pub use config::{ClientConfig, DEFAULT_MAX_AGE_DAYS};
pub use descriptor::ConnectionDescriptor;
pub use registry::{ClientRegistry, RegistryStats};
