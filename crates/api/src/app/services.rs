use std::sync::Arc;

use priceforge_core::Clock;
use priceforge_infra::{EngineConfig, InMemoryPriceFactStore, PriceService};

/// The price service as wired for the HTTP API.
pub type AppPriceService = PriceService<Arc<InMemoryPriceFactStore>, Arc<dyn Clock>>;

/// In-memory wiring: one fact store per process, clock injected by the caller.
pub fn build_services(config: &EngineConfig, clock: Arc<dyn Clock>) -> Arc<AppPriceService> {
    let store = Arc::new(InMemoryPriceFactStore::new());
    Arc::new(PriceService::new(store, clock).with_policy(config.normal_price_policy))
}
