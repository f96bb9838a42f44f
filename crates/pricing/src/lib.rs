//! Pricing domain module.
//!
//! Business rules for layered prices, implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage):
//! - [`money`]: opaque VAT / non-VAT amounts
//! - [`scope`]: (channel, store, SKU) scopes and the scope resolver
//! - [`fact`]: individually-expiring price facts, one per (scope, kind) slot
//! - [`engine`]: the combination engine producing an [`EffectivePrice`]
//! - [`update`]: validation of incoming price updates

pub mod engine;
pub mod fact;
pub mod money;
pub mod scope;
pub mod update;

pub use engine::{CombinationEngine, EffectivePrice, Layer, NormalPricePolicy, SpecialKind, SpecialPrice};
pub use fact::{PriceFact, PriceKind, ScopeFacts};
pub use money::Money;
pub use scope::{resolve, Channel, Scope, ScopeChain};
pub use update::{PriceUpdate, PriceWrite, ValidatedUpdate};
