//! Price fact storage boundary.
//!
//! [`PriceFactStore`] is the persistence boundary of the engine: one atomic
//! slot per (scope, kind), read back per scope. The engine does not care
//! whether an implementation is in-memory or durable.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryPriceFactStore;
pub use r#trait::{FactStoreError, PriceFactStore, SlotWrite};
