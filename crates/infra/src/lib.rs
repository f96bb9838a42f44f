//! Infrastructure layer: fact storage, the price service, config, workers.

pub mod config;
pub mod fact_store;
pub mod service;
pub mod workers;


pub use config::EngineConfig;
pub use fact_store::{FactStoreError, InMemoryPriceFactStore, PriceFactStore, SlotWrite};
pub use service::{PriceService, SkuPrice, UpdateReceipt};
pub use workers::{CompactionWorker, WorkerHandle};
