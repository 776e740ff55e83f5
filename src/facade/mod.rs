pub mod gateway;

pub use gateway::{DocumentGateway, UpsertOutcome, purge_cutoff};
