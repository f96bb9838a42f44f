//! `priceforge-core` — foundation building blocks shared by the pricing engine.
//!
//! This crate contains **pure** primitives (no infrastructure concerns): the
//! error taxonomy, identifiers, the value-object marker and the clock seam.

pub mod clock;
pub mod error;
pub mod id;
pub mod value_object;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{PricingError, PricingResult};
pub use id::FactId;
pub use value_object::ValueObject;
